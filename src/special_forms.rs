use crate::environment::Environment;
use crate::evaluator::{Error, Result};
use crate::interpreter::Interpreter;
use crate::types::{Arity, Cell, Closure, Proc, Symbol};
use std::rc::Rc;

/// `(import "name")`: evaluate a unit against the global environment, at most once per
/// name. The name is recorded before its forms run, so a unit that imports itself
/// terminates.
pub fn apply_import(interp: &mut Interpreter, args: &[Cell]) -> Result {
    Arity::exactly(1).validate_for(args.len(), "import")?;
    let name = args[0].as_string()?;
    if interp.imported.contains(name) {
        log::debug!("import {:?}: already loaded", name);
        return Ok(Cell::Null);
    }
    let source = interp
        .loader
        .load(name)
        .map_err(|source| Error::UnresolvedImport {
            name: name.into(),
            source,
        })?;
    interp.imported.insert(name.into());
    log::info!("import {:?}", name);
    let global = interp.global.clone();
    interp.eval_source(&source, &global)?;
    Ok(Cell::Null)
}

fn bind(
    interp: &mut Interpreter,
    args: &[Cell],
    env: &Rc<Environment>,
    target: &Rc<Environment>,
    form: &str,
) -> Result {
    Arity::exactly(2).validate_for(args.len(), form)?;
    let key = args[0].as_symbol()?;
    let value = interp.eval(&args[1], env)?;
    log::debug!("{} {} to {}", form, key, value);
    target.set(key.clone(), value.clone());
    Ok(value)
}

/// `(set name expr)`: bind in the current (local) environment.
pub fn apply_set(interp: &mut Interpreter, args: &[Cell], env: &Rc<Environment>) -> Result {
    bind(interp, args, env, env, "set")
}

/// `(setg name expr)`: bind in the global environment, whatever the current scope.
pub fn apply_setg(interp: &mut Interpreter, args: &[Cell], env: &Rc<Environment>) -> Result {
    let global = interp.global.clone();
    bind(interp, args, env, &global, "setg")
}

pub fn apply_if(interp: &mut Interpreter, args: &[Cell], env: &Rc<Environment>) -> Result {
    Arity::Between(2..=3).validate_for(args.len(), "if")?;
    let condition = interp.eval(&args[0], env)?.as_bool()?;
    if condition {
        interp.eval(&args[1], env)
    } else if args.len() == 3 {
        interp.eval(&args[2], env)
    } else {
        Ok(Cell::Null)
    }
}

pub fn apply_while(interp: &mut Interpreter, args: &[Cell], env: &Rc<Environment>) -> Result {
    Arity::at_least(1).validate_for(args.len(), "while")?;
    let (condition, body) = args.split_at(1);
    while interp.eval(&condition[0], env)?.as_bool()? {
        for form in body {
            interp.eval(form, env)?;
        }
    }
    Ok(Cell::Null)
}

/// `(defun name (params...) body...)`: bind a new closure under `name` in the current
/// environment and return it.
pub fn apply_defun(args: &[Cell], env: &Rc<Environment>) -> Result {
    Arity::at_least(2).validate_for(args.len(), "defun")?;
    let name = args[0].as_symbol()?.clone();
    let parameters = args[1]
        .as_list()?
        .iter()
        .map(|p| p.as_symbol().map(Symbol::clone))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let closure = Closure {
        name: name.clone(),
        parameters,
        body: args[2..].to_vec(),
        locals: Environment::new(),
    };
    log::debug!("defun {:?}", closure);
    let value = Cell::Proc(Proc::Closure(Rc::new(closure)));
    env.set(name, value.clone());
    Ok(value)
}

/// `(eval expr)`: `expr` must produce a String, whose forms are evaluated in the current
/// environment. The value of the last one is returned.
pub fn apply_eval(interp: &mut Interpreter, args: &[Cell], env: &Rc<Environment>) -> Result {
    Arity::exactly(1).validate_for(args.len(), "eval")?;
    let source = interp.eval(&args[0], env)?;
    let source = source.as_string()?;
    log::info!("eval {:?}", source);
    interp.eval_source(source, env)
}

/// `(typeof x...)`: a bare symbol reports the type of the value it resolves to; anything
/// else reports the type of the form as written, without evaluating it.
pub fn apply_typeof(interp: &mut Interpreter, args: &[Cell], env: &Rc<Environment>) -> Result {
    Arity::at_least(1).validate_for(args.len(), "typeof")?;
    let mut names: Vec<Cell> = args
        .iter()
        .map(|operand| {
            let cell_type = match operand {
                Cell::Symbol(name) => interp.resolve(name, env).cell_type(),
                literal => literal.cell_type(),
            };
            Cell::String(cell_type.to_string())
        })
        .collect();
    match names.len() {
        1 => Ok(names.remove(0)),
        _ => Ok(Cell::wrap_list(names)),
    }
}
