use crate::evaluator;
use crate::host::Output;
use crate::printer::{pr_str, PrintMode};
use crate::strings::{sprintf, MAX_FORMAT_ARITY};
use crate::types::{Arity, Cell, Float, Int, Number, PrimitiveFn, TypeMismatch};
use std::collections::HashMap;
use std::convert::TryFrom;

/// Numeric arguments after the coercion rule: all Int, or all Float if any was Float.
enum Operands {
    Ints(Vec<Int>),
    Floats(Vec<Float>),
}

fn grab_numbers(args: &[Cell]) -> evaluator::Result<Operands> {
    let numbers = args
        .iter()
        .map(Cell::as_number)
        .collect::<Result<Vec<_>, _>>()?;
    if numbers.iter().any(|n| n.is_float()) {
        Ok(Operands::Floats(
            numbers.into_iter().map(Number::as_float).collect(),
        ))
    } else {
        Ok(Operands::Ints(
            numbers
                .into_iter()
                .filter_map(|n| match n {
                    Number::Int(x) => Some(x),
                    Number::Float(_) => None,
                })
                .collect(),
        ))
    }
}

static SUM: PrimitiveFn = PrimitiveFn {
    name: "+",
    fn_ptr: sum_,
    arity: Arity::at_least(0),
};

fn sum_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    match grab_numbers(args)? {
        Operands::Ints(xs) => Ok(Cell::Int(
            xs.iter().fold(0 as Int, |acc, &x| acc.wrapping_add(x)),
        )),
        Operands::Floats(xs) => Ok(Cell::Float(xs.iter().sum())),
    }
}

static SUB: PrimitiveFn = PrimitiveFn {
    name: "-",
    fn_ptr: sub_,
    arity: Arity::at_least(1),
};

fn sub_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    match grab_numbers(args)? {
        Operands::Ints(xs) => Ok(Cell::Int(
            xs[1..].iter().fold(xs[0], |acc, &x| acc.wrapping_sub(x)),
        )),
        Operands::Floats(xs) => Ok(Cell::Float(xs[1..].iter().fold(xs[0], |acc, &x| acc - x))),
    }
}

static MUL: PrimitiveFn = PrimitiveFn {
    name: "*",
    fn_ptr: mul_,
    arity: Arity::at_least(0),
};

fn mul_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    match grab_numbers(args)? {
        Operands::Ints(xs) => Ok(Cell::Int(
            xs.iter().fold(1 as Int, |acc, &x| acc.wrapping_mul(x)),
        )),
        Operands::Floats(xs) => Ok(Cell::Float(xs.iter().product())),
    }
}

static DIV: PrimitiveFn = PrimitiveFn {
    name: "/",
    fn_ptr: div_,
    arity: Arity::at_least(1),
};

fn div_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    match grab_numbers(args)? {
        Operands::Ints(xs) => {
            let mut acc = xs[0];
            for &x in &xs[1..] {
                if x == 0 {
                    return Err(evaluator::Error::DivisionByZero("/"));
                }
                acc = acc.wrapping_div(x);
            }
            Ok(Cell::Int(acc))
        }
        Operands::Floats(xs) => Ok(Cell::Float(xs[1..].iter().fold(xs[0], |acc, &x| acc / x))),
    }
}

static MOD: PrimitiveFn = PrimitiveFn {
    name: "%",
    fn_ptr: mod_,
    arity: Arity::exactly(2),
};

fn mod_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    match grab_numbers(args)? {
        Operands::Ints(xs) if xs[1] == 0 => Err(evaluator::Error::DivisionByZero("%")),
        Operands::Ints(xs) => Ok(Cell::Int(xs[0].wrapping_rem(xs[1]))),
        Operands::Floats(xs) => Ok(Cell::Float(xs[0] % xs[1])),
    }
}

/// `(op a b c)` holds when `a op b` and `a op c`: everything is compared with the first
/// argument, not with its neighbour.
fn comparison_(
    args: &[Cell],
    int_cmp: fn(&Int, &Int) -> bool,
    float_cmp: fn(&Float, &Float) -> bool,
) -> evaluator::Result {
    let holds = match grab_numbers(args)? {
        Operands::Ints(xs) => xs[1..].iter().all(|y| int_cmp(&xs[0], y)),
        Operands::Floats(xs) => xs[1..].iter().all(|y| float_cmp(&xs[0], y)),
    };
    Ok(Cell::Bool(holds))
}

macro_rules! comparison_primitive {
    ($SYMBOL:tt, $NAME:ident) => {
        paste::item! {
            static $NAME: PrimitiveFn = PrimitiveFn {
                name: stringify!($SYMBOL),
                fn_ptr: |args: &[Cell], _: &mut dyn Output| {
                    comparison_(args, Int::[<$NAME:lower>], Float::[<$NAME:lower>])
                },
                arity: Arity::at_least(2),
            };
        }
    };
}

comparison_primitive!(<, LT);
comparison_primitive!(<=, LE);
comparison_primitive!(>, GT);
comparison_primitive!(>=, GE);

static EQUAL: PrimitiveFn = PrimitiveFn {
    name: "=",
    fn_ptr: equal_,
    arity: Arity::at_least(1),
};

fn equal_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    Ok(Cell::Bool(args[1..].iter().all(|x| *x == args[0])))
}

static LIST: PrimitiveFn = PrimitiveFn {
    name: "list",
    fn_ptr: list_,
    arity: Arity::at_least(0),
};

fn list_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    Ok(Cell::wrap_list(args.to_vec()))
}

static APPEND: PrimitiveFn = PrimitiveFn {
    name: "append",
    fn_ptr: append_,
    arity: Arity::at_least(1),
};

fn append_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    let mut elements = match &args[0] {
        Cell::List(list) => list.to_vec(),
        Cell::Null => Vec::new(),
        other => return Err(TypeMismatch::new("List or Null", other).into()),
    };
    elements.extend_from_slice(&args[1..]);
    Ok(Cell::wrap_list(elements))
}

static GET: PrimitiveFn = PrimitiveFn {
    name: "get",
    fn_ptr: get_,
    arity: Arity::exactly(2),
};

fn get_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    let list = args[0].as_list()?;
    let index = args[1].as_int()?;
    usize::try_from(index)
        .ok()
        .and_then(|i| list.get(i))
        .cloned()
        .ok_or(evaluator::Error::IndexOutOfRange {
            index,
            len: list.len(),
        })
}

static LENGTH: PrimitiveFn = PrimitiveFn {
    name: "length",
    fn_ptr: length_,
    arity: Arity::exactly(1),
};

fn length_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    Ok(Cell::Int(args[0].as_list()?.len() as Int))
}

static RETURN: PrimitiveFn = PrimitiveFn {
    name: "return",
    fn_ptr: return_,
    arity: Arity::exactly(1),
};

fn return_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    Ok(args[0].clone())
}

static PRINT: PrimitiveFn = PrimitiveFn {
    name: "print",
    fn_ptr: print_,
    arity: Arity::at_least(0),
};

fn print_(args: &[Cell], out: &mut dyn Output) -> evaluator::Result {
    for arg in args {
        out.write(&pr_str(arg, PrintMode::Directly))?;
    }
    Ok(Cell::Null)
}

static PRINTLN: PrimitiveFn = PrimitiveFn {
    name: "println",
    fn_ptr: println_,
    arity: Arity::at_least(0),
};

fn println_(args: &[Cell], out: &mut dyn Output) -> evaluator::Result {
    if args.is_empty() {
        out.write("\n")?;
    }
    for arg in args {
        out.write(&pr_str(arg, PrintMode::Directly))?;
        out.write("\n")?;
    }
    Ok(Cell::Null)
}

static STRCAT: PrimitiveFn = PrimitiveFn {
    name: "strcat",
    fn_ptr: strcat_,
    arity: Arity::at_least(0),
};

fn strcat_(args: &[Cell], _: &mut dyn Output) -> evaluator::Result {
    Ok(Cell::String(
        args.iter().map(|arg| pr_str(arg, PrintMode::Directly)).collect(),
    ))
}

static FORMAT: PrimitiveFn = PrimitiveFn {
    name: "format",
    fn_ptr: format_,
    arity: Arity::Between(1..=MAX_FORMAT_ARITY),
};

fn format_(args: &[Cell], out: &mut dyn Output) -> evaluator::Result {
    let template = args[0].as_string()?;
    out.write(&sprintf(template, &args[1..])?)?;
    Ok(Cell::Null)
}

type Namespace = HashMap<&'static str, &'static PrimitiveFn>;
lazy_static! {
    pub static ref CORE: Namespace = {
        let mut map = Namespace::new();
        for &func in [
            // Arithmetic
            &SUM,
            &SUB,
            &MUL,
            &DIV,
            &MOD,
            // Comparisons
            &LT,
            &LE,
            &GT,
            &GE,
            &EQUAL,
            // Working with lists
            &LIST,
            &APPEND,
            &GET,
            &LENGTH,
            // Working with strings and output
            &PRINT,
            &PRINTLN,
            &STRCAT,
            &FORMAT,
            // Other
            &RETURN,
        ]
        .iter()
        {
            map.insert(func.name, func);
        }
        map
    };
}
