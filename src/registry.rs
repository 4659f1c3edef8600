//! Provider registry
//!
//! A provider is a named, zero-argument function returning a [`Fragment`].
//! Registering it wraps it with the shared [`Renderer`] and hands back a
//! [`ProviderHandle`] that renders the fragment when called. The registry
//! keeps the handles in registration order and never removes them.

use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::template::{Fragment, Renderer};

type ProviderFn = dyn Fn() -> Result<Fragment>;

/// A registered provider, callable on its own
#[derive(Clone)]
pub struct ProviderHandle {
    name: Rc<str>,
    body: Rc<ProviderFn>,
    renderer: Rc<Renderer>,
}

impl ProviderHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the provider and render what it returns
    pub fn call(&self) -> Result<String> {
        log::debug!("invoking provider {}", self.name);
        let fragment = (self.body)()?;
        self.renderer.render(&self.name, &fragment)
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered, append-only collection of providers
#[derive(Debug)]
pub struct Registry {
    renderer: Rc<Renderer>,
    providers: Vec<ProviderHandle>,
}

impl Registry {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer: Rc::new(renderer),
            providers: Vec::new(),
        }
    }

    /// Register a provider and return a handle to it.
    ///
    /// Names are not required to be unique; lookups by name see the
    /// earliest registration.
    pub fn register<F>(&mut self, name: impl Into<String>, body: F) -> ProviderHandle
    where
        F: Fn() -> Result<Fragment> + 'static,
    {
        let name: String = name.into();
        let handle = ProviderHandle {
            name: Rc::from(name),
            body: Rc::new(body),
            renderer: Rc::clone(&self.renderer),
        };
        log::debug!("registered provider {}", handle.name);
        self.providers.push(handle.clone());
        handle
    }

    /// First provider registered under `name`
    pub fn find(&self, name: &str) -> Option<&ProviderHandle> {
        self.providers.iter().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderHandle> {
        self.providers.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(ProviderHandle::name).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a ProviderHandle;
    type IntoIter = std::slice::Iter<'a, ProviderHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.providers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::template::Bindings;
    use std::cell::Cell;

    fn registry() -> Registry {
        Registry::new(Renderer::new("jinja-templates"))
    }

    #[test]
    fn test_register_keeps_order() {
        let mut reg = registry();
        reg.register("b", || Ok(Fragment::inline("B", Bindings::new())));
        reg.register("a", || Ok(Fragment::inline("A", Bindings::new())));

        assert_eq!(reg.names(), vec!["b", "a"]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_handle_renders() {
        let mut reg = registry();
        let greet = reg.register("greet", || {
            Ok(Fragment::new(
                "<template>{{ msg }}</template>",
                Bindings::new().with("msg", "hello"),
            ))
        });

        assert_eq!(greet.name(), "greet");
        assert_eq!(greet.call().unwrap(), "<template>hello</template>");
    }

    #[test]
    fn test_handle_invokes_body_each_call() {
        let mut reg = registry();
        let counter = Rc::new(Cell::new(0));
        let seen = Rc::clone(&counter);
        let handle = reg.register("count", move || {
            seen.set(seen.get() + 1);
            Ok(Fragment::inline(
                "{{ n }}",
                Bindings::new().with("n", seen.get()),
            ))
        });

        assert_eq!(handle.call().unwrap(), "1");
        assert_eq!(handle.call().unwrap(), "2");
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_find_first_match() {
        let mut reg = registry();
        reg.register("dup", || Ok(Fragment::inline("first", Bindings::new())));
        reg.register("dup", || Ok(Fragment::inline("second", Bindings::new())));

        assert_eq!(reg.find("dup").unwrap().call().unwrap(), "first");
        assert!(reg.find("other").is_none());
    }

    #[test]
    fn test_body_error_propagates() {
        let mut reg = registry();
        let bad = reg.register("bad", || {
            Err(Error::Shape {
                provider: "bad".to_string(),
                message: "template must be a string".to_string(),
            })
        });

        assert!(matches!(bad.call(), Err(Error::Shape { .. })));
    }
}
