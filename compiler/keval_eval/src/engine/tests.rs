use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::{FunctionDescriptor, OverloadTable, ParseFailureKind, RollbackPolicy};
use pretty_assertions::assert_eq;

fn add() -> FunctionDescriptor<i64> {
    FunctionDescriptor::new(0, |args: &[i64]| args[0] + args[1])
}

fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

/// Accepts one ASCII digit as a constant, optionally flipping the phase.
#[derive(Default)]
struct Digit {
    flip: bool,
    table: OverloadTable<i64, char>,
}

impl Recognizer<i64, char> for Digit {
    fn parse(
        &self,
        pos: &mut usize,
        input: &[char],
        phase: &mut Phase,
        output: &mut PostfixExpression<i64>,
    ) -> bool {
        let Some(digit) = input.get(*pos).and_then(|c| c.to_digit(10)) else {
            return false;
        };
        output.push_constant(i64::from(digit));
        *pos += 1;
        if self.flip {
            *phase = phase.flip();
        }
        true
    }

    fn overloads(&self) -> &OverloadTable<i64, char> {
        &self.table
    }

    fn overloads_mut(&mut self) -> &mut OverloadTable<i64, char> {
        &mut self.table
    }
}

/// Accepts one specific character and pushes a fixed value for it.
struct Tag {
    key: char,
    value: i64,
    table: OverloadTable<i64, char>,
}

impl Tag {
    fn new(key: char, value: i64) -> Self {
        Tag {
            key,
            value,
            table: OverloadTable::new(),
        }
    }
}

impl Recognizer<i64, char> for Tag {
    fn parse(
        &self,
        pos: &mut usize,
        input: &[char],
        _phase: &mut Phase,
        output: &mut PostfixExpression<i64>,
    ) -> bool {
        if input.get(*pos) != Some(&self.key) {
            return false;
        }
        output.push_constant(self.value);
        *pos += 1;
        true
    }

    fn overloads(&self) -> &OverloadTable<i64, char> {
        &self.table
    }

    fn overloads_mut(&mut self) -> &mut OverloadTable<i64, char> {
        &mut self.table
    }
}

/// Emits calls for any single-character name in its table, using the
/// highest-priority overload.
#[derive(Default)]
struct Operator {
    table: OverloadTable<i64, char>,
}

impl Recognizer<i64, char> for Operator {
    fn parse(
        &self,
        pos: &mut usize,
        input: &[char],
        _phase: &mut Phase,
        output: &mut PostfixExpression<i64>,
    ) -> bool {
        let Some((arity, function)) = input
            .get(*pos..=*pos)
            .and_then(|name| self.table.preferred(name))
        else {
            return false;
        };
        output.push_call(function.clone(), arity);
        *pos += 1;
        true
    }

    fn overloads(&self) -> &OverloadTable<i64, char> {
        &self.table
    }

    fn overloads_mut(&mut self) -> &mut OverloadTable<i64, char> {
        &mut self.table
    }
}

/// Writes to every output parameter, then declines.
#[derive(Default)]
struct Greedy {
    table: OverloadTable<i64, char>,
}

impl Recognizer<i64, char> for Greedy {
    fn parse(
        &self,
        pos: &mut usize,
        _input: &[char],
        phase: &mut Phase,
        output: &mut PostfixExpression<i64>,
    ) -> bool {
        output.push_constant(-1);
        *pos += 5;
        *phase = phase.flip();
        false
    }

    fn overloads(&self) -> &OverloadTable<i64, char> {
        &self.table
    }

    fn overloads_mut(&mut self) -> &mut OverloadTable<i64, char> {
        &mut self.table
    }
}

/// Accepts without consuming input while its budget lasts.
#[derive(Default)]
struct Idle {
    remaining: Option<AtomicUsize>,
    table: OverloadTable<i64, char>,
}

impl Idle {
    fn forever() -> Self {
        Idle::default()
    }

    fn times(count: usize) -> Self {
        Idle {
            remaining: Some(AtomicUsize::new(count)),
            table: OverloadTable::new(),
        }
    }
}

impl Recognizer<i64, char> for Idle {
    fn parse(
        &self,
        _pos: &mut usize,
        _input: &[char],
        _phase: &mut Phase,
        _output: &mut PostfixExpression<i64>,
    ) -> bool {
        match &self.remaining {
            None => true,
            Some(remaining) => remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok(),
        }
    }

    fn overloads(&self) -> &OverloadTable<i64, char> {
        &self.table
    }

    fn overloads_mut(&mut self) -> &mut OverloadTable<i64, char> {
        &mut self.table
    }
}

fn adder() -> Operator {
    let mut operator = Operator::default();
    operator.add_overload(&['+'], 2, 0, |args: &[i64]| args[0] + args[1]);
    operator.add_overload(&['-'], 2, 0, |args: &[i64]| args[0] - args[1]);
    operator
}

// Evaluation

#[test]
fn test_evaluate_happy_path() {
    let mut expr = PostfixExpression::new();
    expr.push_constant(2);
    expr.push_constant(3);
    expr.push_call(add(), 2);

    let engine: Engine<i64, char> = Engine::new();
    assert_eq!(engine.evaluate(&expr), Ok(5));
}

#[test]
fn test_evaluate_stack_underflow() {
    let mut expr = PostfixExpression::new();
    expr.push_constant(3);
    expr.push_call(add(), 2);

    let engine: Engine<i64, char> = Engine::new();
    assert_eq!(
        engine.evaluate(&expr),
        Err(EvalError::StackUnderflow {
            position: 1,
            needed: 2,
            available: 1,
        })
    );
}

#[test]
fn test_evaluate_invalid_final_stack() {
    let engine: Engine<i64, char> = Engine::new();

    let two: PostfixExpression<i64> = [1, 2].into_iter().map(Element::Constant).collect();
    assert_eq!(
        engine.evaluate(&two),
        Err(EvalError::InvalidStackSize { size: 2 })
    );

    assert_eq!(
        engine.evaluate(&PostfixExpression::new()),
        Err(EvalError::InvalidStackSize { size: 0 })
    );
}

#[test]
fn test_evaluate_passes_operands_in_push_order() {
    let sub = FunctionDescriptor::new(0, |args: &[i64]| args[0] - args[1]);
    let mut expr = PostfixExpression::new();
    expr.push_constant(10);
    expr.push_variable(3);
    expr.push_call(sub, 2);

    let engine: Engine<i64, char> = Engine::new();
    assert_eq!(engine.evaluate(&expr), Ok(7));
}

#[test]
fn test_evaluate_nullary_and_deep_calls() {
    let forty = FunctionDescriptor::new(0, |_: &[i64]| 40);
    let sum = FunctionDescriptor::new(0, |args: &[i64]| args.iter().sum::<i64>());
    let mut expr = PostfixExpression::new();
    expr.push_call(forty, 0);
    for value in 1..=20 {
        expr.push_constant(value);
    }
    // 20 operands, past the inline stack capacity.
    expr.push_call(sum, 20);
    expr.push_call(add(), 2);

    let engine: Engine<i64, char> = Engine::new();
    assert_eq!(engine.evaluate(&expr), Ok(40 + 210));
    assert_eq!(expr.verify(), Ok(()));
}

// Parsing

#[test]
fn test_parse_and_run_postfix_input() {
    let mut engine: Engine<i64, char> = Engine::new();
    engine.add_handler_front(Phase::Pre, adder());
    engine.add_handler_front(Phase::Pre, Digit::default());

    let mut output = PostfixExpression::new();
    assert_eq!(engine.parse(&mut output, &chars("23+")), Ok(()));
    assert_eq!(output.to_string(), "2 3 <fn/2>");
    assert_eq!(engine.evaluate(&output), Ok(5));

    assert_eq!(engine.run(&chars("93-4+")), Ok(10));
}

#[test]
fn test_parse_empty_input() {
    let mut engine: Engine<i64, char> = Engine::new();
    engine.add_handler_front(Phase::Pre, Digit::default());

    let mut output = PostfixExpression::new();
    output.push_constant(99);
    assert_eq!(engine.parse(&mut output, &[]), Ok(()));
    assert!(output.is_empty());

    assert_eq!(
        engine.run(&[]),
        Err(EngineError::Eval(EvalError::InvalidStackSize { size: 0 }))
    );
}

#[test]
fn test_parse_no_match_reports_position_and_phase() {
    let mut engine: Engine<i64, char> = Engine::new();
    engine.add_handler_front(Phase::Pre, Digit { flip: true, ..Digit::default() });

    let mut output = PostfixExpression::new();
    let failure = engine.parse(&mut output, &chars("12"));

    assert_eq!(failure, Err(ParseFailure::no_match(1, Phase::Post)));
    assert_eq!(output.to_string(), "1");
    assert_eq!(
        engine.run(&chars("12")),
        Err(EngineError::Parse(ParseFailure::no_match(1, Phase::Post)))
    );
}

#[test]
fn test_empty_chain_fails_immediately() {
    let engine: Engine<i64, char> = Engine::new();
    let mut output = PostfixExpression::new();
    let failure = engine.parse(&mut output, &chars("1"));
    assert_eq!(failure.map_err(|f| f.kind), Err(ParseFailureKind::NoMatch));
}

#[test]
fn test_front_recognizer_wins() {
    let mut engine: Engine<i64, char> = Engine::new();
    engine.add_handler_front(Phase::Pre, Tag::new('x', 1));
    engine.add_handler_front(Phase::Pre, Tag::new('x', 2));

    assert_eq!(engine.run(&chars("x")), Ok(2));
    assert_eq!(engine.chain_len(Phase::Pre), 2);
    assert_eq!(engine.chain_len(Phase::Post), 0);
}

#[test]
fn test_phase_flip_switches_chain() {
    let mut engine: Engine<i64, char> = Engine::new();
    engine.add_handler_front(Phase::Pre, Digit { flip: true, ..Digit::default() });
    engine.add_handler_front(Phase::Post, Tag::new('1', 100));

    let mut output = PostfixExpression::new();
    assert_eq!(engine.parse(&mut output, &chars("11")), Ok(()));
    // The second '1' is a digit too, but only the post chain is consulted.
    assert_eq!(output.to_string(), "1 100");
}

#[test]
fn test_declined_attempt_is_rolled_back() {
    let mut engine: Engine<i64, char> = Engine::new();
    engine.add_handler_front(Phase::Pre, Digit::default());
    engine.add_handler_front(Phase::Pre, Greedy::default());

    let mut output = PostfixExpression::new();
    assert_eq!(engine.parse(&mut output, &chars("7")), Ok(()));
    assert_eq!(output.to_string(), "7");
    assert_eq!(engine.options().rollback, RollbackPolicy::Truncate);
}

#[test]
fn test_keep_policy_leaves_declined_output() {
    let mut engine: Engine<i64, char> = Engine::builder()
        .rollback(RollbackPolicy::Keep)
        .handler(Phase::Pre, Digit::default())
        .build();
    engine.add_handler_front(Phase::Pre, Greedy::default());

    let mut output = PostfixExpression::new();
    assert_eq!(engine.parse(&mut output, &chars("7")), Ok(()));
    // Position and phase are still restored; only the output is kept.
    assert_eq!(output.to_string(), "-1 7");
}

#[test]
fn test_stalled_parse_fails() {
    let mut engine: Engine<i64, char> = Engine::new();
    engine.add_handler_front(Phase::Pre, Idle::forever());

    let mut output = PostfixExpression::new();
    let failure = engine.parse(&mut output, &chars("1"));
    assert_eq!(failure, Err(ParseFailure::stalled(0, Phase::Pre)));
}

#[test]
fn test_bounded_stall_is_tolerated() {
    let mut engine: Engine<i64, char> = Engine::builder()
        .stall_limit(Some(3))
        .handler(Phase::Pre, Digit::default())
        .handler(Phase::Pre, Idle::times(3))
        .build();

    assert_eq!(engine.run(&chars("4")), Ok(4));

    engine.add_handler_front(Phase::Pre, Idle::times(4));
    let failure = engine.run(&chars("4"));
    assert_eq!(
        failure,
        Err(EngineError::Parse(ParseFailure::stalled(0, Phase::Pre)))
    );
}

#[test]
fn test_parse_replaces_previous_output() {
    let mut engine: Engine<i64, char> = Engine::new();
    engine.add_handler_front(Phase::Pre, Digit::default());

    let mut output = PostfixExpression::new();
    assert_eq!(engine.parse(&mut output, &chars("1")), Ok(()));
    assert_eq!(engine.parse(&mut output, &chars("2")), Ok(()));
    assert_eq!(output.to_string(), "2");
}

// Registration

#[test]
fn test_builder_registers_in_call_order() {
    let engine: Engine<i64, char> = Engine::builder()
        .handler(Phase::Pre, Tag::new('x', 1))
        .handler(Phase::Pre, Tag::new('x', 2))
        .handler(Phase::Post, Tag::new('y', 3))
        .build();

    assert_eq!(engine.chain_len(Phase::Pre), 2);
    assert_eq!(engine.chain_len(Phase::Post), 1);
    assert_eq!(engine.run(&chars("x")), Ok(2));
    assert_eq!(engine.options(), &EngineOptions::default());
}

#[test]
fn test_shared_handler_in_both_chains() {
    let mut engine: Engine<i64, char> = Engine::new();
    let digit = engine.add_handler_front(Phase::Pre, Digit { flip: true, ..Digit::default() });
    engine.add_shared_handler_front(Phase::Post, digit.clone());

    let pre = engine.chain(Phase::Pre).next().cloned();
    let post = engine.chain(Phase::Post).next().cloned();
    assert!(pre.zip(post).is_some_and(|(a, b)| Arc::ptr_eq(&a, &b)));

    let mut output = PostfixExpression::new();
    assert_eq!(engine.parse(&mut output, &chars("123")), Ok(()));
    assert_eq!(output.len(), 3);
}

#[test]
fn test_debug_lists_recognizer_names() {
    let mut engine: Engine<i64, char> = Engine::new();
    engine.add_handler_front(Phase::Post, Tag::new('x', 1));
    let rendered = format!("{engine:?}");
    assert!(rendered.contains("Tag"));
}

#[test]
fn test_engine_is_send_and_sync() {
    fn assert_send_sync<S: Send + Sync>() {}
    assert_send_sync::<Engine<i64, char>>();
}

mod proptest_engine {
    use super::*;
    use proptest::prelude::*;

    /// `None` is a constant 1, `Some(n)` a call summing `n` operands.
    fn stream() -> impl Strategy<Value = Vec<Option<usize>>> {
        proptest::collection::vec(proptest::option::of(0usize..4), 0..24)
    }

    proptest! {
        #[test]
        fn verify_agrees_with_evaluate(ops in stream()) {
            let sum = FunctionDescriptor::new(0, |args: &[i64]| args.iter().sum::<i64>());
            let expr: PostfixExpression<i64> = ops
                .iter()
                .map(|op| match op {
                    None => Element::Constant(1),
                    Some(arity) => Element::Call {
                        function: sum.clone(),
                        arity: *arity,
                    },
                })
                .collect();
            let engine: Engine<i64, char> = Engine::new();

            let result = engine.evaluate(&expr);
            prop_assert_eq!(expr.verify(), result.clone().map(|_| ()));

            // Summing preserves the total, so a valid stream yields the
            // number of constants.
            if let Ok(value) = result {
                let constants = ops.iter().filter(|op| op.is_none()).count();
                prop_assert_eq!(usize::try_from(value).ok(), Some(constants));
            }
        }
    }
}
