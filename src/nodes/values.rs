use tracing::warn;

use crate::data::NodeRegistry;
use crate::graph::{NodeDescriptor, NodeLogic, Outputs, Value, ValueContext, ValueKind};

/// Constant `true`.
struct TrueLogic;

impl NodeLogic for TrueLogic {
    fn evaluate(&self, _cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
        out.set("value", Value::Bool(true));
    }
}

/// Constant `false`.
struct FalseLogic;

impl NodeLogic for FalseLogic {
    fn evaluate(&self, _cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
        out.set("value", Value::Bool(false));
    }
}

/// Authored integer constant.
struct IntegerLogic;

impl NodeLogic for IntegerLogic {
    fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
        out.set("output", Value::Int(cx.variable("value").into_int()));
    }
}

/// Authored string constant.
struct StringLogic;

impl NodeLogic for StringLogic {
    fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
        out.set("output", Value::String(cx.variable("text").into_string()));
    }
}

/// Reads a variable by key, ability scope first, then the flow blackboard.
struct BlackboardLogic;

impl NodeLogic for BlackboardLogic {
    fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
        let key = cx.variable("key").into_string();
        let value = match cx.read_variable(&key) {
            Some(value) => value,
            None => {
                warn!(node = cx.node_id(), key = %key, "blackboardNode: unknown key, reading 0");
                0
            }
        };
        out.set("value", Value::Int(value));
    }
}

/// Boolean negation.
struct NotLogic;

impl NodeLogic for NotLogic {
    fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
        let value = cx.input("value").into_bool();
        out.set("result", Value::Bool(!value));
    }
}

/// Integer division, 0 on a zero divisor.
struct DivideLogic;

impl NodeLogic for DivideLogic {
    fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
        let a = cx.input("a").into_int();
        let b = cx.input("b").into_int();
        let result = match a.checked_div(b) {
            Some(result) => result,
            None => {
                // Covers the zero divisor and the MIN / -1 overflow.
                warn!(node = cx.node_id(), "divideNode: invalid division, reading 0");
                0
            }
        };
        out.set("result", Value::Int(result));
    }
}

/// Master macro for the binary operator families: arithmetic on ints,
/// comparisons from ints to bool, and boolean combinators. Defines the
/// logic structs and one registration function for all of them.
macro_rules! define_operator_nodes {
    (
        $( ($arith_logic:ident, $arith_type:expr, Arithmetic, $arith_op:ident) ),* $(,)? ;
        $( ($cmp_logic:ident, $cmp_type:expr, Comparison, $cmp_op:tt) ),* $(,)? ;
        $( ($bool_logic:ident, $bool_type:expr, Boolean, $bool_op:tt) ),* $(,)?
    ) => {
        $(
            struct $arith_logic;
            impl NodeLogic for $arith_logic {
                fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
                    let a = cx.input("a").into_int();
                    let b = cx.input("b").into_int();
                    out.set("result", Value::Int(a.$arith_op(b)));
                }
            }
        )*
        $(
            struct $cmp_logic;
            impl NodeLogic for $cmp_logic {
                fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
                    let a = cx.input("a").into_int();
                    let b = cx.input("b").into_int();
                    out.set("result", Value::Bool(a $cmp_op b));
                }
            }
        )*
        $(
            struct $bool_logic;
            impl NodeLogic for $bool_logic {
                fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
                    let a = cx.input("a").into_bool();
                    let b = cx.input("b").into_bool();
                    out.set("result", Value::Bool(a $bool_op b));
                }
            }
        )*

        fn register_operator_nodes(registry: &mut NodeRegistry) {
            $(
                registry.register(
                    NodeDescriptor::value($arith_type, || Box::new($arith_logic))
                        .with_inport("a", ValueKind::Int)
                        .with_inport("b", ValueKind::Int)
                        .with_outport("result", ValueKind::Int),
                );
            )*
            $(
                registry.register(
                    NodeDescriptor::value($cmp_type, || Box::new($cmp_logic))
                        .with_inport("a", ValueKind::Int)
                        .with_inport("b", ValueKind::Int)
                        .with_outport("result", ValueKind::Bool),
                );
            )*
            $(
                registry.register(
                    NodeDescriptor::value($bool_type, || Box::new($bool_logic))
                        .with_inport("a", ValueKind::Bool)
                        .with_inport("b", ValueKind::Bool)
                        .with_outport("result", ValueKind::Bool),
                );
            )*
        }
    };
}

define_operator_nodes! {
    // Arithmetic (saturating, stats never wrap)
    (AddLogic, "addNode", Arithmetic, saturating_add),
    (SubtractLogic, "subtractNode", Arithmetic, saturating_sub),
    (MultiplyLogic, "multiplyNode", Arithmetic, saturating_mul)

    ; // Comparisons

    (EqualLogic, "equalNode", Comparison, ==),
    (NotEqualLogic, "notEqualNode", Comparison, !=),
    (GreaterLogic, "greaterNode", Comparison, >),
    (LessLogic, "lessNode", Comparison, <)

    ; // Boolean combinators

    (AndLogic, "andNode", Boolean, &&),
    (OrLogic, "orNode", Boolean, ||),
    (XorLogic, "xorNode", Boolean, ^)
}

pub(super) fn register_value_nodes(registry: &mut NodeRegistry) {
    registry.register(
        NodeDescriptor::value("trueNode", || Box::new(TrueLogic))
            .with_outport("value", ValueKind::Bool),
    );
    registry.register(
        NodeDescriptor::value("falseNode", || Box::new(FalseLogic))
            .with_outport("value", ValueKind::Bool),
    );
    registry.register(
        NodeDescriptor::value("integerNode", || Box::new(IntegerLogic))
            .with_variable("value", ValueKind::Int)
            .with_outport("output", ValueKind::Int),
    );
    registry.register(
        NodeDescriptor::value("stringNode", || Box::new(StringLogic))
            .with_variable("text", ValueKind::String)
            .with_outport("output", ValueKind::String),
    );
    registry.register(
        NodeDescriptor::value("blackboardNode", || Box::new(BlackboardLogic))
            .with_variable("key", ValueKind::String)
            .with_outport("value", ValueKind::Int),
    );
    registry.register(
        NodeDescriptor::value("notNode", || Box::new(NotLogic))
            .with_inport("value", ValueKind::Bool)
            .with_outport("result", ValueKind::Bool),
    );
    registry.register(
        NodeDescriptor::value("divideNode", || Box::new(DivideLogic))
            .with_inport("a", ValueKind::Int)
            .with_inport("b", ValueKind::Int)
            .with_outport("result", ValueKind::Int),
    );
    register_operator_nodes(registry);
}
