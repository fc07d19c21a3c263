//! Expression evaluation over an allowlist of node kinds.
//!
//! Only numeric literals, unary `+`/`-` and the binary operators
//! `+ - * / % ** //` are evaluated. Every other node the parser can
//! produce is refused, including ones that would yield a number.

use std::fmt;

use super::error::EvalError;
use super::parser::{self, BinaryOp, Expr, Literal, UnaryOp};

/// Result of evaluating an expression.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    /// Get the value as a float.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

/// Integral values print without a fraction, everything else in the
/// shortest form that parses back to the same float. Never uses exponent
/// notation so the text can be fed back into [`evaluate`].
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) if value == 0.0 => write!(f, "0"),
            Self::Float(value) if value.fract() == 0.0 => write!(f, "{:.0}", value),
            Self::Float(value) => write!(f, "{}", value),
        }
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(input: &str) -> Result<Number, EvalError> {
    let tree = parser::parse(input)?;
    eval_node(&tree)
}

fn eval_node(node: &Expr) -> Result<Number, EvalError> {
    match node {
        Expr::Literal(literal) => eval_literal(literal),
        Expr::Unary {
            op: UnaryOp::Plus,
            operand,
        } => eval_node(operand),
        Expr::Unary {
            op: UnaryOp::Minus,
            operand,
        } => negate(eval_node(operand)?),
        Expr::Binary { op, left, right } => {
            let op = ArithOp::from_binary(*op).ok_or(EvalError::DisallowedConstruct {
                construct: "binary operator",
            })?;
            let left = eval_node(left)?;
            let right = eval_node(right)?;
            apply(op, left, right)
        }
        other => Err(EvalError::DisallowedConstruct {
            construct: other.kind_name(),
        }),
    }
}

fn eval_literal(literal: &Literal) -> Result<Number, EvalError> {
    match literal {
        Literal::Int(value) => Ok(Number::Int(*value)),
        Literal::Float(value) => finite(*value),
        Literal::Str(text) => Err(EvalError::InvalidLiteral {
            literal: format!("{:?}", text),
        }),
        Literal::Bool(value) => Err(EvalError::InvalidLiteral {
            literal: if *value { "True" } else { "False" }.to_string(),
        }),
        Literal::None => Err(EvalError::InvalidLiteral {
            literal: "None".to_string(),
        }),
    }
}

/// The seven operators the evaluator accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

impl ArithOp {
    fn from_binary(op: BinaryOp) -> Option<Self> {
        match op {
            BinaryOp::Add => Some(Self::Add),
            BinaryOp::Sub => Some(Self::Sub),
            BinaryOp::Mul => Some(Self::Mul),
            BinaryOp::Div => Some(Self::Div),
            BinaryOp::FloorDiv => Some(Self::FloorDiv),
            BinaryOp::Mod => Some(Self::Mod),
            BinaryOp::Pow => Some(Self::Pow),
            _ => None,
        }
    }
}

fn negate(value: Number) -> Result<Number, EvalError> {
    match value {
        Number::Int(v) => v
            .checked_neg()
            .map(Number::Int)
            .ok_or(EvalError::IntegerOverflow),
        Number::Float(v) => Ok(Number::Float(-v)),
    }
}

fn apply(op: ArithOp, left: Number, right: Number) -> Result<Number, EvalError> {
    if let (Number::Int(a), Number::Int(b)) = (left, right)
        && let Some(result) = apply_int(op, a, b)?
    {
        return Ok(result);
    }
    apply_float(op, left.as_f64(), right.as_f64())
}

/// Exact integer arithmetic. `Ok(None)` means the operation has a real
/// result (true division, negative exponent) and float arithmetic applies.
/// Results outside the `i128` range are an error, never rounded.
fn apply_int(op: ArithOp, a: i128, b: i128) -> Result<Option<Number>, EvalError> {
    let result = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Sub => a.checked_sub(b),
        ArithOp::Mul => a.checked_mul(b),
        ArithOp::Div => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            return Ok(None);
        }
        ArithOp::FloorDiv => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_div(b).map(|q| {
                if a % b != 0 && (a < 0) != (b < 0) {
                    q - 1
                } else {
                    q
                }
            })
        }
        ArithOp::Mod => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            // i128::MIN % -1 overflows but is exactly zero
            let r = a.checked_rem(b).unwrap_or(0);
            Some(if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
        }
        ArithOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                return Ok(None);
            }
            match (a, u32::try_from(b)) {
                (_, Ok(exp)) => a.checked_pow(exp),
                (0 | 1, Err(_)) => Some(a),
                (-1, Err(_)) => Some(if b % 2 == 0 { 1 } else { -1 }),
                _ => None,
            }
        }
    };
    result
        .map(|value| Some(Number::Int(value)))
        .ok_or(EvalError::IntegerOverflow)
}

/// Floored quotient and remainder of two floats. The quotient is derived
/// from the remainder so that `a == b * q + r` holds up to rounding, and
/// is snapped to the nearest integer.
fn float_divmod(a: f64, b: f64) -> (f64, f64) {
    let mut r = a % b;
    let mut q = (a - r) / b;

    if r != 0.0 {
        if (r < 0.0) != (b < 0.0) {
            r += b;
            q -= 1.0;
        }
    } else {
        r = 0.0_f64.copysign(b);
    }

    if q != 0.0 {
        let floored = q.floor();
        q = if q - floored > 0.5 { floored + 1.0 } else { floored };
    } else {
        q = 0.0_f64.copysign(a / b);
    }

    (q, r)
}

fn apply_float(op: ArithOp, a: f64, b: f64) -> Result<Number, EvalError> {
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            a / b
        }
        ArithOp::FloorDiv => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            float_divmod(a, b).0
        }
        ArithOp::Mod => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            float_divmod(a, b).1
        }
        ArithOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            a.powf(b)
        }
    };
    finite(result)
}

fn finite(value: f64) -> Result<Number, EvalError> {
    if value.is_finite() {
        Ok(Number::Float(value))
    } else {
        Err(EvalError::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::EvalErrorKind;

    fn kind(input: &str) -> EvalErrorKind {
        evaluate(input).unwrap_err().kind()
    }

    #[test]
    fn test_basic_evaluation() {
        assert_eq!(evaluate("2+3*4").unwrap(), Number::Int(14));
        assert_eq!(evaluate("2**10").unwrap(), Number::Int(1024));
        assert_eq!(evaluate("(2+3)*4").unwrap(), Number::Int(20));
        assert_eq!(evaluate(" 10 - 4 - 3 ").unwrap(), Number::Int(3));
    }

    #[test]
    fn test_true_division_is_float() {
        assert_eq!(evaluate("7/2").unwrap(), Number::Float(3.5));
        assert_eq!(evaluate("4/2").unwrap(), Number::Float(2.0));
    }

    #[test]
    fn test_floor_division() {
        assert_eq!(evaluate("7//2").unwrap(), Number::Int(3));
        assert_eq!(evaluate("-7//2").unwrap(), Number::Int(-4));
        assert_eq!(evaluate("7//-2").unwrap(), Number::Int(-4));
        assert_eq!(evaluate("7.5//2").unwrap(), Number::Float(3.0));
    }

    #[test]
    fn test_modulo_follows_divisor_sign() {
        assert_eq!(evaluate("-7%2").unwrap(), Number::Int(1));
        assert_eq!(evaluate("7%-2").unwrap(), Number::Int(-1));
        assert_eq!(evaluate("7%2").unwrap(), Number::Int(1));
        assert_eq!(evaluate("-7.5%2").unwrap(), Number::Float(0.5));
    }

    #[test]
    fn test_power() {
        assert_eq!(evaluate("-2**2").unwrap(), Number::Int(-4));
        assert_eq!(evaluate("2**3**2").unwrap(), Number::Int(512));
        assert_eq!(evaluate("2**-1").unwrap(), Number::Float(0.5));
        assert_eq!(evaluate("16**0.5").unwrap(), Number::Float(4.0));
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(evaluate("-3").unwrap(), Number::Int(-3));
        assert_eq!(evaluate("+3").unwrap(), Number::Int(3));
        assert_eq!(evaluate("--3").unwrap(), Number::Int(3));
        assert_eq!(evaluate("2*-3").unwrap(), Number::Int(-6));
    }

    #[test]
    fn test_float_floor_division_matches_modulo() {
        assert_eq!(evaluate("1//0.1").unwrap(), Number::Float(9.0));
        assert_eq!(evaluate("1%0.1").unwrap(), Number::Float(0.09999999999999995));
        assert_eq!(evaluate("-1//0.1").unwrap(), Number::Float(-10.0));

        for (a, b) in [(1.0, 0.1), (-1.0, 0.1), (1.0, -0.1), (7.5, 2.0), (0.3, 0.1), (-5.25, -0.5)] {
            let q = evaluate(&format!("{}//{}", a, b)).unwrap().as_f64();
            let r = evaluate(&format!("{}%{}", a, b)).unwrap().as_f64();
            assert_eq!(q.fract(), 0.0, "{} // {}", a, b);
            assert!((q * b + r - a).abs() < 1e-12, "{} divmod {}", a, b);
            assert!(r == 0.0 || (r < 0.0) == (b < 0.0), "{} % {}", a, b);
        }
    }

    #[test]
    fn test_integer_results_stay_exact() {
        let product = evaluate("99999999999*99999999999").unwrap();
        assert_eq!(product, Number::Int(9_999_999_999_800_000_000_001));
        assert_eq!(product.to_string(), "9999999999800000000001");

        assert_eq!(
            evaluate("9223372036854775807+1").unwrap(),
            Number::Int(9_223_372_036_854_775_808)
        );
        assert_eq!(
            evaluate("10**30").unwrap().to_string(),
            "1000000000000000000000000000000"
        );
        assert_eq!(evaluate("1**99999999999999999999").unwrap(), Number::Int(1));
        assert_eq!(evaluate("(-1)**99999999999999999999").unwrap(), Number::Int(-1));
    }

    #[test]
    fn test_integer_out_of_range() {
        assert_eq!(kind("2**127"), EvalErrorKind::IntegerOverflow);
        assert_eq!(kind("2**200"), EvalErrorKind::IntegerOverflow);
        assert_eq!(kind("10**20*10**20"), EvalErrorKind::IntegerOverflow);
        assert_eq!(kind(&"9".repeat(40)), EvalErrorKind::IntegerOverflow);
        // mixing in a float opts into float arithmetic
        assert_eq!(evaluate("2.0**200").unwrap(), Number::Float(2f64.powi(200)));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(kind("7/0"), EvalErrorKind::DivisionByZero);
        assert_eq!(kind("7//0"), EvalErrorKind::DivisionByZero);
        assert_eq!(kind("7%0"), EvalErrorKind::DivisionByZero);
        assert_eq!(kind("7/0.0"), EvalErrorKind::DivisionByZero);
        assert_eq!(kind("0**-1"), EvalErrorKind::DivisionByZero);
    }

    #[test]
    fn test_non_finite_results() {
        assert_eq!(kind("(-8)**0.5"), EvalErrorKind::NonFinite);
        assert_eq!(kind("10.0**400"), EvalErrorKind::NonFinite);
        assert_eq!(kind("1e999"), EvalErrorKind::NonFinite);
    }

    #[test]
    fn test_disallowed_constructs() {
        for input in [
            "__import__('os')",
            "abs(-5)",
            "x",
            "x + 1",
            "os.system",
            "(1).real",
            "[1, 2]",
            "(1, 2)",
            "[1][0]",
            "1 < 2",
            "1 == 1",
            "1 and 2",
            "not 1",
            "~1",
            "1 << 2",
            "6 & 3",
            "1 @ 2",
        ] {
            assert_eq!(
                kind(input),
                EvalErrorKind::DisallowedConstruct,
                "input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_invalid_literals() {
        assert_eq!(kind("'abc'"), EvalErrorKind::InvalidLiteral);
        assert_eq!(kind("True"), EvalErrorKind::InvalidLiteral);
        assert_eq!(kind("None"), EvalErrorKind::InvalidLiteral);
        assert_eq!(kind("1 + True"), EvalErrorKind::InvalidLiteral);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(kind(""), EvalErrorKind::Syntax);
        assert_eq!(kind("2+"), EvalErrorKind::Syntax);
        assert_eq!(kind("2++"), EvalErrorKind::Syntax);
        assert_eq!(kind("*2"), EvalErrorKind::Syntax);
        assert_eq!(kind("lambda: 1"), EvalErrorKind::Syntax);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(Number::Int(4).to_string(), "4");
        assert_eq!(Number::Float(2.0).to_string(), "2");
        assert_eq!(Number::Float(-0.0).to_string(), "0");
        assert_eq!(Number::Float(3.5).to_string(), "3.5");
        assert_eq!(Number::Float(1e20).to_string(), "100000000000000000000");
        assert_eq!(Number::Float(0.1 + 0.2).to_string(), "0.30000000000000004");
    }

    #[test]
    fn test_formatted_result_parses_back() {
        for input in ["1/3", "2**-20", "10**30", "-7/2"] {
            let first = evaluate(input).unwrap();
            let again = evaluate(&first.to_string()).unwrap();
            assert_eq!(first.as_f64(), again.as_f64(), "input: {:?}", input);
        }
    }
}
