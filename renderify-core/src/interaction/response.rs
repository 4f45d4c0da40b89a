use eyre::Report;

use crate::{error::Result, Error, Scope};

use super::{completion_key, Completion};

/// The completion callbacks as seen from a position in the tree.
///
/// Empty when no active host encloses the widget.
pub struct Response<T, E = Report> {
    completion: Option<Completion<T, E>>,
}

/// Returns the completion published by the nearest enclosing active [`InteractionHost`].
///
/// [`InteractionHost`]: super::InteractionHost
pub fn use_response<T: 'static, E: 'static>(scope: &Scope<'_>) -> Response<T, E> {
    Response {
        completion: scope.get_context(completion_key::<T, E>()).cloned(),
    }
}

impl<T, E> Response<T, E> {
    /// Returns true if there is an interaction which can still be settled
    pub fn is_live(&self) -> bool {
        self.completion.as_ref().is_some_and(|v| v.is_live())
    }

    pub fn completion(&self) -> Option<&Completion<T, E>> {
        self.completion.as_ref()
    }

    /// Settles the enclosing interaction with `value`.
    ///
    /// Fails with [`Error::NoActiveInteraction`] if there is no enclosing interaction.
    pub fn resolve(&self, value: T) -> Result<()> {
        self.get()?.resolve(value)
    }

    /// Fails the enclosing interaction with `error`.
    ///
    /// Fails with [`Error::NoActiveInteraction`] if there is no enclosing interaction.
    pub fn reject(&self, error: E) -> Result<()> {
        self.get()?.reject(error)
    }

    fn get(&self) -> Result<&Completion<T, E>> {
        self.completion.as_ref().ok_or(Error::NoActiveInteraction)
    }
}

impl<T, E> Clone for Response<T, E> {
    fn clone(&self) -> Self {
        Self {
            completion: self.completion.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for Response<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("completion", &self.completion)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use futures::FutureExt;
    use parking_lot::Mutex;

    use crate::{
        interaction::{Completion, InteractionHost},
        AppExecutor, Requestor,
    };

    use super::*;

    #[test]
    fn outside_host() {
        let mut executor = AppExecutor::new();
        let seen = Arc::new(Mutex::new(None));

        let s = seen.clone();
        executor.attach_root(move |scope: &mut Scope<'_>| {
            *s.lock() = Some(use_response::<i32, Report>(scope));
        });

        let response = seen.lock().take().unwrap();
        assert!(!response.is_live());
        assert!(response.completion().is_none());
        assert_eq!(response.resolve(1), Err(Error::NoActiveInteraction));
        assert_eq!(
            response.reject(eyre::eyre!("nope")),
            Err(Error::NoActiveInteraction)
        );
    }

    #[test]
    fn deeply_nested() {
        let mut executor = AppExecutor::new();
        let requestor = Requestor::<&'static str>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        executor.attach_root(
            InteractionHost::new(move |scope: &mut Scope<'_>| {
                let s = s.clone();
                scope.attach(move |scope: &mut Scope<'_>| {
                    scope.attach(move |scope: &mut Scope<'_>| {
                        s.lock().push(use_response::<&'static str, Report>(scope));
                    });
                });
            })
            .with_handle(requestor.handle()),
        );

        executor.update();
        assert!(seen.lock().is_empty());

        let interaction = requestor.trigger().unwrap();
        executor.update();

        let response = seen.lock().pop().unwrap();
        let controller = requestor.handle().get().unwrap();
        assert!(response
            .completion()
            .unwrap()
            .ptr_eq(&controller.completion().unwrap()));

        response.resolve("nested").unwrap();
        assert_eq!(interaction.now_or_never().unwrap().unwrap(), "nested");

        // The response belongs to the settled interaction
        assert!(!response.is_live());
        assert_eq!(response.resolve("again"), Err(Error::NotInProgress));
    }

    #[derive(Debug, PartialEq, thiserror::Error)]
    enum PickError {
        #[error("Nothing picked")]
        Dismissed,
        #[error(transparent)]
        Host(#[from] Error),
    }

    #[test]
    fn reject_from_nested() {
        let mut executor = AppExecutor::new();
        let requestor = Requestor::<u32, PickError>::new();
        let seen = Arc::new(Mutex::new(None));

        let s = seen.clone();
        executor.attach_root(
            InteractionHost::builder(move |scope: &mut Scope<'_>, _: &Completion<u32, PickError>| {
                let s = s.clone();
                scope.attach(move |scope: &mut Scope<'_>| {
                    *s.lock() = Some(use_response::<u32, PickError>(scope));
                });
            })
            .with_handle(requestor.handle()),
        );

        let interaction = requestor.trigger().unwrap();
        executor.update();

        let response = seen.lock().take().unwrap();
        assert!(response.is_live());

        response.reject(PickError::Dismissed).unwrap();
        assert_eq!(
            interaction.now_or_never(),
            Some(Err(PickError::Dismissed))
        );

        assert!(!requestor.handle().get().unwrap().is_active());
        assert_eq!(response.reject(PickError::Dismissed), Err(Error::NotInProgress));

        executor.update();
        let interaction = requestor.trigger().unwrap();
        executor.update();

        // The re-rendered children see the new interaction
        let response = seen.lock().take().unwrap();
        response.resolve(3).unwrap();
        assert_eq!(interaction.now_or_never(), Some(Ok(3)));
    }
}
