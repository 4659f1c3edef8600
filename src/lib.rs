//! jaiml - Jinja-templated AIML
//!
//! Providers are zero-argument functions that return a template and its
//! variables. A [`Registry`] renders them through MiniJinja; the
//! [`Assembler`] joins every provider's output between a header and footer
//! into one AIML document, and the [`Emitter`] writes providers to files of
//! their own.
//!
//! ```no_run
//! use jaiml::{Assembler, Bindings, DocumentConfig, Fragment, Registry, Renderer};
//!
//! let mut registry = Registry::new(Renderer::new("jinja-templates"));
//! let greet = registry.register("greet", || {
//!     Ok(Fragment::new(
//!         "<category><pattern>HI</pattern><template>{{msg}}</template></category>",
//!         Bindings::new().with("msg", "hello"),
//!     ))
//! });
//!
//! let config = DocumentConfig::default();
//! println!("{}", greet.call()?);
//! println!("{}", Assembler::new(&registry, &config).render_all()?);
//! # Ok::<(), jaiml::Error>(())
//! ```

pub mod assembler;
pub mod cli;
pub mod config;
pub mod emitter;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod scaffold;
pub mod template;

pub use assembler::Assembler;
pub use config::DocumentConfig;
pub use emitter::Emitter;
pub use error::{Error, Result};
pub use registry::{ProviderHandle, Registry};
pub use template::{Bindings, Fragment, Renderer, TemplateSource};
