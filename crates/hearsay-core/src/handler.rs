//! Handler system for `hears` registrations.
//!
//! A handler is any function or closure whose first parameter is the
//! [`Dispatcher`] and whose remaining parameters receive the captured
//! placeholder values, in declaration order:
//!
//! ```rust,ignore
//! use hearsay_core::{Dispatcher, HandlerResult};
//!
//! fn greet(bot: &mut Dispatcher, name: String) -> HandlerResult {
//!     bot.respond(&format!("Hello, {name}!"))?;
//!     Ok(())
//! }
//!
//! bot.hears("hi {name}", greet)?;
//! bot.hears("ping", |bot: &mut Dispatcher| -> HandlerResult {
//!     bot.respond("pong")?;
//!     Ok(())
//! })?;
//! ```
//!
//! Closures need their parameter and return types spelled out; the blanket
//! implementations below are selected from the closure's signature.
//!
//! The number of capture parameters is known statically through
//! [`Handler::ARITY`], so [`Dispatcher::hears`] rejects a handler whose arity
//! does not fit the pattern before anything is registered.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::dispatcher::Dispatcher;

/// Result returned by handlers.
pub type HandlerResult = anyhow::Result<()>;

/// A per-request registration routine.
///
/// Hosting layers keep one of these and run it against every freshly built
/// [`Dispatcher`].
pub type BotScript = Arc<dyn Fn(&mut Dispatcher) -> HandlerResult + Send + Sync>;

// ============================================================================
// Handler Trait
// ============================================================================

/// A callable that can be bound to a pattern.
///
/// # Blanket Implementation
///
/// Implemented for every `Fn(&mut Dispatcher, String, ...) -> HandlerResult`
/// taking between 0 and 8 capture parameters.
///
/// No handler takes more than 8 captures, so a pattern declaring 9 or more
/// placeholders always fails registration with
/// [`HearsError::ArityMismatch`](crate::HearsError::ArityMismatch).
pub trait Handler<Args>: Send + Sync + 'static {
    /// Number of capture parameters after the dispatcher.
    const ARITY: usize;

    /// Invokes the handler with one value per capture parameter.
    fn call(&self, dispatcher: &mut Dispatcher, captures: Vec<String>) -> HandlerResult;
}

// ============================================================================
// Type Erasure
// ============================================================================

/// Wraps a [`Handler`] so it can be stored behind a trait object.
pub struct HandlerFn<F, T> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> HandlerFn<F, T> {
    /// Wraps a handler.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

/// Type-erased handler trait for dynamic dispatch.
pub trait ErasedHandler: Send + Sync {
    /// Number of capture parameters.
    fn arity(&self) -> usize;

    /// Invokes the handler.
    fn call(&self, dispatcher: &mut Dispatcher, captures: Vec<String>) -> HandlerResult;
}

impl<F, T> ErasedHandler for HandlerFn<F, T>
where
    F: Handler<T>,
    T: 'static,
{
    fn arity(&self) -> usize {
        F::ARITY
    }

    fn call(&self, dispatcher: &mut Dispatcher, captures: Vec<String>) -> HandlerResult {
        self.f.call(dispatcher, captures)
    }
}

/// A type-erased handler that can be stored in the pattern table.
pub type BoxedHandler = Arc<dyn ErasedHandler>;

/// Converts a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(HandlerFn::new(f))
}

// ============================================================================
// Handler implementations for functions
// ============================================================================

impl<F> Handler<()> for F
where
    F: Fn(&mut Dispatcher) -> HandlerResult + Send + Sync + 'static,
{
    const ARITY: usize = 0;

    fn call(&self, dispatcher: &mut Dispatcher, _captures: Vec<String>) -> HandlerResult {
        (self)(dispatcher)
    }
}

/// Generates `Handler` implementations for handlers taking `$arity` captures.
macro_rules! impl_handler {
    (
        $arity:literal; $($name:ident: $ty:ty),+
    ) => {
        impl<F> Handler<($($ty,)+)> for F
        where
            F: Fn(&mut Dispatcher, $($ty),+) -> HandlerResult + Send + Sync + 'static,
        {
            const ARITY: usize = $arity;

            fn call(&self, dispatcher: &mut Dispatcher, captures: Vec<String>) -> HandlerResult {
                let [$($name),+] = <[String; $arity]>::try_from(captures).map_err(|found| {
                    anyhow::anyhow!(
                        "handler expects {} capture(s), got {}",
                        $arity,
                        found.len()
                    )
                })?;

                (self)(dispatcher, $($name),+)
            }
        }
    };
}

impl_handler!(1; c1: String);
impl_handler!(2; c1: String, c2: String);
impl_handler!(3; c1: String, c2: String, c3: String);
impl_handler!(4; c1: String, c2: String, c3: String, c4: String);
impl_handler!(5; c1: String, c2: String, c3: String, c4: String, c5: String);
impl_handler!(6; c1: String, c2: String, c3: String, c4: String, c5: String, c6: String);
impl_handler!(
    7; c1: String, c2: String, c3: String, c4: String, c5: String, c6: String, c7: String
);
impl_handler!(
    8; c1: String, c2: String, c3: String, c4: String, c5: String, c6: String, c7: String,
    c8: String
);
