use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::value::{Value, ValueError};
use crate::syntax::ast::Type;

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    ty: Type,
    /// Sizes from a `hairetsu a = { .. }` declaration. Cleared when the whole
    /// array is reassigned.
    dims: Option<Vec<i64>>,
}

#[derive(Debug, Default)]
struct Scope {
    vars: HashMap<String, Binding>,
    parent: Option<Env>,
}

/// Shared handle to a lexical scope. Cloning the handle shares the scope;
/// closures hold one to keep their defining scope alive.
#[derive(Debug, Clone, Default)]
pub struct Env(Rc<RefCell<Scope>>);

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Env {
        Env(Rc::new(RefCell::new(Scope { vars: HashMap::new(), parent: Some(self.clone()) })))
    }

    /// Binds `name` in this scope, replacing any binding of the same name here.
    /// Fails when `value` does not fit a binding of type `ty`.
    pub fn declare(&self, name: &str, value: Value, ty: Type) -> Result<(), ValueError> {
        let value = value.coerce_to(ty)?;
        self.0.borrow_mut().vars.insert(name.to_string(), Binding { value, ty, dims: None });
        Ok(())
    }

    /// Binds a zero-filled array of the given dimensions and remembers them.
    pub fn declare_array(&self, name: &str, dims: Vec<i64>) -> Result<(), ValueError> {
        let value = Value::zeros(&dims)?;
        let binding = Binding { value, ty: Type::Array, dims: Some(dims) };
        self.0.borrow_mut().vars.insert(name.to_string(), binding);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.lookup(name, |b| b.value.clone())
    }

    /// Declared type of the nearest binding of `name`.
    pub fn type_of(&self, name: &str) -> Option<Type> {
        self.lookup(name, |b| b.ty)
    }

    /// Dimensions of the array bound to `name`: the declared sizes when it
    /// was declared with them, its shape otherwise.
    pub fn dims(&self, name: &str) -> Option<Result<Vec<i64>, ValueError>> {
        self.lookup(name, |b| match (&b.dims, &b.value) {
            (Some(dims), _) => Ok(dims.clone()),
            (None, array @ Value::Array(_)) => Ok(array.shape()),
            (None, other) => Err(ValueError::Conversion { from: other.ty(), to: Type::Array }),
        })
    }

    /// Overwrites the nearest binding of `name`. Returns `Ok(false)` when no
    /// scope binds it.
    pub fn set(&self, name: &str, value: Value) -> Result<bool, ValueError> {
        let mut scope = self.0.borrow_mut();
        if let Some(binding) = scope.vars.get_mut(name) {
            binding.value = value.coerce_to(binding.ty)?;
            binding.dims = None;
            return Ok(true);
        }
        match &scope.parent {
            Some(parent) => parent.set(name, value),
            None => Ok(false),
        }
    }

    /// Runs `f` on the stored value of `name` in place.
    pub fn with_value_mut<R>(&self, name: &str, f: impl FnOnce(&mut Value) -> R) -> Option<R> {
        let mut scope = self.0.borrow_mut();
        if let Some(binding) = scope.vars.get_mut(name) {
            return Some(f(&mut binding.value));
        }
        match &scope.parent {
            Some(parent) => parent.with_value_mut(name, f),
            None => None,
        }
    }

    /// Bindings owned by this scope, sorted by name.
    pub fn local_bindings(&self) -> Vec<(String, Value)> {
        let mut out: Vec<_> = self
            .0
            .borrow()
            .vars
            .iter()
            .map(|(k, b)| (k.clone(), b.value.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    fn lookup<R>(&self, name: &str, f: impl FnOnce(&Binding) -> R) -> Option<R> {
        let scope = self.0.borrow();
        if let Some(binding) = scope.vars.get(name) {
            return Some(f(binding));
        }
        scope.parent.as_ref().and_then(|p| p.lookup(name, f))
    }
}
