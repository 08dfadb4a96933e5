//! Reduction of delayed values and the arithmetic they rely on.
//!
//! [`evaluate`] is pure and also used by the parser for constant folding.
//! Everything that needs a scope lives on `Context`.

use super::{Chain, Context};
use crate::error::{CompileError, Result};
use crate::parser::values::is_ident_char;
use crate::types::{BinOp, Color, Prop, Stylesheet, Value};

/// Applies `op` to two concrete values.
///
/// ```
/// use lessc::compiler::evaluate;
/// use lessc::types::{BinOp, Value};
///
/// let width = evaluate(BinOp::Sub, &Value::with_unit(960.0, "px"), &Value::number(200.0));
/// assert_eq!(width.unwrap(), Value::with_unit(760.0, "px"));
/// ```
pub fn evaluate(op: BinOp, left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Color(l), Value::Color(r)) => color_op(op, *l, *r),
        (Value::Color(l), Value::Number { value, unit }) => {
            color_op(op, *l, broadcast(*value, unit))
        }
        (Value::Number { value, unit }, Value::Color(r)) => {
            color_op(op, broadcast(*value, unit), *r)
        }
        (
            Value::Number { value: lv, unit: lu },
            Value::Number { value: rv, unit: ru },
        ) => number_op(op, *lv, lu, *rv, ru),
        _ if op == BinOp::Add && (left.text().is_some() || right.text().is_some()) => {
            Ok(concat(left, right))
        }
        _ => Ok(Value::Keyword(format!("{left} {right}"))),
    }
}

fn divide_by_zero() -> CompileError {
    CompileError::Arithmetic("can't divide by zero".to_string())
}

/// A scalar as a gray color; percentages scale into `0..=255`.
fn broadcast(value: f64, unit: &str) -> Color {
    let v = if unit == "%" { value / 100.0 * 255.0 } else { value };
    Color::rgb(v, v, v)
}

fn color_op(op: BinOp, left: Color, right: Color) -> Result<Value> {
    if matches!(op, BinOp::Div | BinOp::Rem) && [right.r, right.g, right.b].contains(&0.0) {
        return Err(divide_by_zero());
    }
    let color = left.zip_with(right, |l, r| op.apply(l, r).unwrap_or(0.0));
    Ok(Value::Color(color.fixed()))
}

fn number_op(op: BinOp, left: f64, left_unit: &str, right: f64, right_unit: &str) -> Result<Value> {
    let right = if right_unit == "%" { right / 100.0 } else { right };
    let unit = if right_unit.is_empty() || right_unit == "%" {
        left_unit
    } else {
        right_unit
    };
    let value = op.apply(left, right).ok_or_else(divide_by_zero)?;
    Ok(Value::with_unit(value, unit))
}

fn plain_text(value: &Value) -> String {
    value
        .text()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

fn concat(left: &Value, right: &Value) -> Value {
    let text = format!("{}{}", plain_text(left), plain_text(right));
    match left {
        Value::String { delim, .. } => Value::String {
            delim: *delim,
            text,
        },
        _ => Value::Keyword(text),
    }
}

fn negate(value: Value) -> Value {
    match value {
        Value::Number { value, unit } => Value::Number {
            value: -value,
            unit,
        },
        Value::Color(c) => Value::Color(
            Color {
                r: -c.r,
                g: -c.g,
                b: -c.b,
                a: c.a,
            }
            .fixed(),
        ),
        other => Value::Keyword(format!("-{other}")),
    }
}

/// `rgb`, `rgba`, `hsl` and `hsla` with numeric arguments.
fn color_constructor(name: &str, args: &[Value]) -> Option<Color> {
    fn number(value: &Value) -> Option<(f64, &str)> {
        match value {
            Value::Number { value, unit } => Some((*value, unit.as_str())),
            _ => None,
        }
    }
    fn channel(value: &Value) -> Option<f64> {
        let (v, unit) = number(value)?;
        Some(if unit == "%" { v * 255.0 / 100.0 } else { v })
    }
    fn fraction(value: &Value) -> Option<f64> {
        let (v, unit) = number(value)?;
        Some(if unit == "%" { v / 100.0 } else { v })
    }
    fn plain(value: &Value) -> Option<f64> {
        number(value).map(|(v, _)| v)
    }

    let color = match (name, args) {
        ("rgb", [r, g, b]) => Color::rgb(channel(r)?, channel(g)?, channel(b)?),
        ("rgba", [r, g, b, a]) => Color::rgba(channel(r)?, channel(g)?, channel(b)?, fraction(a)?),
        ("hsl", [h, s, l]) => Color::from_hsl(plain(h)?, plain(s)?, plain(l)?, None),
        ("hsla", [h, s, l, a]) => {
            Color::from_hsl(plain(h)?, plain(s)?, plain(l)?, Some(fraction(a)?))
        }
        _ => return None,
    };
    Some(color.fixed())
}

impl Context<'_> {
    /// Reduces `value` until it is concrete.
    pub(crate) fn reduce(&mut self, value: &Value, chain: &Chain) -> Result<Value> {
        match value {
            Value::Variable(name) => self.reduce_variable(name, chain),
            Value::Expression { op, left, right } => {
                let left = self.reduce(left, chain)?;
                let right = self.reduce(right, chain)?;
                evaluate(*op, &left, &right)
            }
            Value::Negative(inner) => Ok(negate(self.reduce(inner, chain)?)),
            Value::Function { name, args } => self.call(name, args, chain),
            Value::Lookup { path, member } => self.lookup(path, member, chain),
            Value::List { delim, items } => Ok(Value::List {
                delim: *delim,
                items: items
                    .iter()
                    .map(|item| self.reduce(item, chain))
                    .collect::<Result<_>>()?,
            }),
            Value::String { delim, text } => Ok(Value::String {
                delim: *delim,
                text: self.interpolate(text, chain)?,
            }),
            Value::Number { .. } | Value::Color(_) | Value::Keyword(_) => Ok(value.clone()),
        }
    }

    /// Like [`Context::reduce`], but an undefined variable yields `default`.
    pub(crate) fn reduce_or(
        &mut self,
        value: &Value,
        chain: &Chain,
        default: Value,
    ) -> Result<Value> {
        match self.reduce(value, chain) {
            Err(CompileError::UnresolvedVariable(_)) => Ok(default),
            other => other,
        }
    }

    /// Reads `name`. While a variable is being reduced, a reference to the
    /// same name reads the binding it shadows.
    fn reduce_variable(&mut self, name: &str, chain: &Chain) -> Result<Value> {
        let skip = self.resolving[self.resolve_floor..]
            .iter()
            .filter(|n| *n == name)
            .count();
        let Some(bound) = self.scope.get_shadowed(name, skip).cloned() else {
            return Err(if skip > 0 {
                CompileError::RecursiveVariable(format!("@{name}"))
            } else {
                CompileError::UnresolvedVariable(format!("@{name}"))
            });
        };

        self.resolving.push(name.to_string());
        let result = self.reduce(&bound, chain);
        self.resolving.pop();
        result
    }

    fn call(&mut self, name: &str, args: &[Value], chain: &Chain) -> Result<Value> {
        let args = args
            .iter()
            .map(|arg| self.reduce(arg, chain))
            .collect::<Result<Vec<_>>>()?;

        if let Some(color) = color_constructor(name, &args) {
            return Ok(Value::Color(color));
        }
        if let Some(value) = self.functions.call(name, &args) {
            return Ok(value);
        }
        let call = Value::Function {
            name: name.to_string(),
            args,
        };
        Ok(Value::Keyword(call.to_string()))
    }

    /// `path['member']`: the last assignment to `member` in the block at
    /// `path`, reduced with the variables of that block and its enclosing
    /// blocks in scope.
    fn lookup(&mut self, path: &[String], member: &str, chain: &Chain) -> Result<Value> {
        let described = || format!("{}['{member}']", path.join(" > "));
        let target = self
            .resolve_path(path, chain)
            .ok_or_else(|| CompileError::UnresolvedMixin(path.join(" > ")))?;

        let key = (target, member.to_string());
        if self.lookups.contains(&key) {
            return Err(CompileError::RecursiveVariable(described()));
        }

        let sheet = self.sheet;
        let block = sheet.get(target);
        let value = block
            .assignment(member)
            .ok_or_else(|| CompileError::UnresolvedVariable(member.to_string()))?;

        // outermost first, so inner blocks shadow; root is already in scope
        let mut lineage = std::iter::successors(Some(target), |id| sheet.get(*id).parent)
            .filter(|id| *id != Stylesheet::ROOT)
            .collect::<Vec<_>>();
        lineage.reverse();
        for id in &lineage {
            self.scope.push();
            for prop in &sheet.get(*id).props {
                if let Prop::Assign { name, value } = prop {
                    if let Some(var) = name.strip_prefix('@') {
                        self.scope.set(var, value.clone());
                    }
                }
            }
        }
        let outer_floor = std::mem::replace(&mut self.resolve_floor, self.resolving.len());
        self.lookups.push(key);

        let inner = chain.enter(target);
        let result = match member.strip_prefix('@') {
            Some(var) => self.reduce_variable(var, &inner),
            None => self.reduce(value, &inner),
        };

        self.lookups.pop();
        self.resolve_floor = outer_floor;
        for _ in &lineage {
            self.scope.pop();
        }
        result
    }

    /// Replaces `{@name}` markers in string text. Unknown names stay as
    /// written.
    fn interpolate(&mut self, text: &str, chain: &Chain) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find("{@") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let len = after
                .find(|c: char| !is_ident_char(c))
                .unwrap_or(after.len());

            if len == 0 || !after[len..].starts_with('}') {
                out.push_str("{@");
                rest = after;
                continue;
            }

            let marker = &rest[start..start + len + 3];
            let variable = Value::Variable(after[..len].to_string());
            let value = self.reduce_or(&variable, chain, Value::keyword(marker))?;
            out.push_str(&plain_text(&value));
            rest = &after[len + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{FunctionRegistry, Scope};
    use crate::types::ListDelim;

    fn color(hex: &str) -> Value {
        Value::Color(Color::from_hex(hex).unwrap())
    }

    #[test]
    fn test_color_addition_clamps() {
        let sum = evaluate(BinOp::Add, &color("#ffffff"), &color("#000001")).unwrap();
        assert_eq!(sum.to_string(), "#ffffff");
        let sum = evaluate(BinOp::Add, &color("#000000"), &color("#010101")).unwrap();
        assert_eq!(sum.to_string(), "#010101");
    }

    #[test]
    fn test_color_scalar() {
        let v = evaluate(BinOp::Mul, &color("#102030"), &Value::number(2.0)).unwrap();
        assert_eq!(v.to_string(), "#204060");
        let v = evaluate(BinOp::Add, &Value::with_unit(10.0, "%"), &color("#000000")).unwrap();
        assert_eq!(v.to_string(), "#191919");
    }

    #[test]
    fn test_alpha_is_combined_and_clamped() {
        let translucent = Value::Color(Color::rgba(0.0, 0.0, 0.0, 0.5));
        let v = evaluate(BinOp::Add, &color("#ffffff"), &translucent).unwrap();
        assert_eq!(v.to_string(), "rgba(255,255,255,0.5)");
        let v = evaluate(BinOp::Add, &translucent, &translucent).unwrap();
        assert_eq!(v.to_string(), "rgba(0,0,0,1)");
    }

    #[test]
    fn test_number_units() {
        let px = |n| Value::with_unit(n, "px");
        assert_eq!(evaluate(BinOp::Sub, &px(960.0), &Value::number(200.0)).unwrap(), px(760.0));
        assert_eq!(evaluate(BinOp::Add, &Value::number(1.0), &px(2.0)).unwrap(), px(3.0));
        assert_eq!(
            evaluate(BinOp::Mul, &px(10.0), &Value::with_unit(50.0, "%")).unwrap(),
            px(5.0)
        );
        assert_eq!(
            evaluate(BinOp::Rem, &Value::number(7.0), &Value::number(4.0)).unwrap(),
            Value::number(3.0)
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            evaluate(BinOp::Div, &Value::number(1.0), &Value::number(0.0)),
            Err(CompileError::Arithmetic(_))
        ));
        assert!(matches!(
            evaluate(BinOp::Div, &color("#ffffff"), &color("#000000")),
            Err(CompileError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_string_operations() {
        let s = Value::String {
            delim: '"',
            text: "foo".into(),
        };
        assert_eq!(
            evaluate(BinOp::Add, &s, &Value::keyword("bar")).unwrap(),
            Value::String {
                delim: '"',
                text: "foobar".into()
            }
        );
        assert_eq!(
            evaluate(BinOp::Add, &Value::keyword("a"), &Value::number(1.0)).unwrap(),
            Value::keyword("a1")
        );
        assert_eq!(
            evaluate(BinOp::Sub, &Value::keyword("a"), &Value::keyword("b")).unwrap(),
            Value::keyword("a b")
        );
    }

    #[test]
    fn test_color_constructors() {
        let n = Value::number;
        assert_eq!(
            color_constructor("rgb", &[n(255.0), n(0.0), Value::with_unit(100.0, "%")]),
            Some(Color::rgb(255.0, 0.0, 255.0))
        );
        assert_eq!(
            color_constructor("rgba", &[n(1.0), n(2.0), n(3.0), n(0.5)]),
            Some(Color::rgba(1.0, 2.0, 3.0, 0.5))
        );
        assert_eq!(
            color_constructor(
                "hsl",
                &[n(0.0), Value::with_unit(100.0, "%"), Value::with_unit(50.0, "%")]
            ),
            Some(Color::rgb(255.0, 0.0, 0.0))
        );
        assert_eq!(color_constructor("rgb", &[n(1.0), n(2.0)]), None);
        assert_eq!(color_constructor("rgb", &[n(1.0), n(2.0), Value::keyword("x")]), None);
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let sheet = Stylesheet::new();
        let functions = FunctionRegistry::default();
        let mut context = Context {
            sheet: &sheet,
            scope: Scope::new(),
            functions: &functions,
            resolving: Vec::new(),
            resolve_floor: 0,
            lookups: Vec::new(),
        };
        let chain = Chain::root();

        let concrete = [
            Value::with_unit(1.5, "em"),
            color("#336699"),
            Value::Color(Color::rgba(10.0, 20.0, 30.0, 0.25)),
            Value::keyword("solid"),
            Value::String {
                delim: '\'',
                text: "plain".into(),
            },
            Value::List {
                delim: ListDelim::Space,
                items: vec![Value::with_unit(1.0, "px"), Value::keyword("solid")],
            },
        ];
        for value in concrete {
            assert_eq!(context.reduce(&value, &chain).unwrap(), value);
        }

        context.scope.set("w", Value::with_unit(10.0, "px"));
        let delayed = Value::Expression {
            op: BinOp::Mul,
            left: Box::new(Value::Variable("w".into())),
            right: Box::new(Value::number(2.0)),
        };
        let once = context.reduce(&delayed, &chain).unwrap();
        assert_eq!(once, Value::with_unit(20.0, "px"));
        assert_eq!(context.reduce(&once, &chain).unwrap(), once);
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(Value::with_unit(2.0, "em")), Value::with_unit(-2.0, "em"));
        assert_eq!(negate(Value::keyword("auto")), Value::keyword("-auto"));
    }
}
