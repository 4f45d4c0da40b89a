//! Awaiting user interactions rendered by the widget tree.
//!
//! An [`InteractionHost`] renders nothing until an interaction is started through its
//! [`Requestor`]. It then renders its children until one of them, or the owner, settles the
//! interaction, at which point the future returned by [`Requestor::trigger`] completes and the host
//! is empty again.
mod completion;
mod host;
mod requestor;
mod response;
mod state;

pub use completion::*;
pub use host::*;
pub use requestor::*;
pub use response::*;
pub use state::*;

use crate::context::ContextKey;

/// The completion published by an active host to its descendants
pub(crate) fn completion_key<T: 'static, E: 'static>() -> ContextKey<Completion<T, E>> {
    ContextKey::of_type()
}

#[cfg(test)]
mod test {
    use futures::FutureExt;
    use tracing_subscriber::{prelude::*, EnvFilter};
    use tracing_tree::HierarchicalLayer;

    use crate::{
        events::Click,
        widget::{Button, Container, Text},
        AppExecutor, Error, Scope,
    };

    use super::*;

    fn init_tracing() {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(HierarchicalLayer::new(4).with_indent_lines(true))
            .try_init()
            .ok();
    }

    /// Mounts a yes/no dialog and returns the requestor and the host node
    fn confirm_dialog(executor: &mut AppExecutor) -> (Requestor<&'static str>, crate::tree::NodeId) {
        let requestor = Requestor::new();

        let host = executor.attach_root(
            InteractionHost::builder(|scope: &mut Scope<'_>, completion: &Completion<_>| {
                let yes = completion.clone();
                let no = completion.clone();

                scope.attach(Container::new(
                    "Dialog",
                    (
                        Text::new("Are you sure?"),
                        Button::new("Yes", move || {
                            yes.resolve("yes").ok();
                        }),
                        Button::new("No", move || {
                            no.resolve("no").ok();
                        }),
                    ),
                ));
            })
            .with_handle(requestor.handle()),
        );

        (requestor, host)
    }

    fn click(executor: &mut AppExecutor, root: crate::tree::NodeId, label: &str) {
        let target = executor.find_text(root, label).unwrap();
        assert!(executor.send_event(root, &Click { target }).is_handled());
    }

    #[test]
    fn confirm_scenario() {
        init_tracing();

        let mut executor = AppExecutor::new();
        let (requestor, host) = confirm_dialog(&mut executor);

        executor.update();
        assert_eq!(executor.render_tree(host), "");

        let mut f1 = requestor.trigger().unwrap();
        executor.update();

        assert_eq!(
            executor.render_tree(host),
            "Dialog\n  \"Are you sure?\"\n  Button \"Yes\"\n  Button \"No\"\n"
        );
        assert!((&mut f1).now_or_never().is_none());

        click(&mut executor, host, "Yes");
        executor.update();

        assert_eq!(f1.now_or_never().unwrap().unwrap(), "yes");
        assert_eq!(executor.render_tree(host), "");
        assert!(executor.children(host).is_empty());

        let f2 = requestor.trigger().unwrap();
        executor.update();
        assert!(!executor.children(host).is_empty());

        assert_eq!(requestor.trigger().err(), Some(Error::AlreadyInProgress));

        click(&mut executor, host, "No");
        executor.update();
        assert_eq!(f2.now_or_never().unwrap().unwrap(), "no");
    }

    #[test]
    fn static_children_use_response() {
        init_tracing();

        let mut executor = AppExecutor::new();
        let requestor = Requestor::<u32>::new();

        let host = executor.attach_root(
            InteractionHost::new(|scope: &mut Scope<'_>| {
                scope.attach(|scope: &mut Scope<'_>| {
                    let response = use_response::<u32, eyre::Report>(scope);
                    scope.attach(Button::new("Pick", move || {
                        response.resolve(42).ok();
                    }));
                });
            })
            .with_handle(requestor.handle()),
        );

        let interaction = requestor.trigger().unwrap();
        executor.update();

        click(&mut executor, host, "Pick");
        assert_eq!(interaction.now_or_never().unwrap().unwrap(), 42);

        executor.update();
        assert!(executor.children(host).is_empty());
    }

    #[test]
    fn unmount_while_active() {
        init_tracing();

        let mut executor = AppExecutor::new();
        let (requestor, host) = confirm_dialog(&mut executor);

        let interaction = requestor.trigger().unwrap();
        executor.update();
        let stale = requestor.handle().get().unwrap().completion().unwrap();

        executor.detach(host);

        let err = interaction.now_or_never().unwrap().unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::HostUnmounted));

        assert_eq!(requestor.trigger().err(), Some(Error::NotMounted));
        assert_eq!(stale.resolve("late"), Err(Error::NotInProgress));

        executor.update();
        assert_eq!(executor.task_count(), 0);
    }

    #[test]
    fn reject_from_owner() {
        let mut executor = AppExecutor::new();
        let (requestor, host) = confirm_dialog(&mut executor);

        let interaction = requestor.trigger().unwrap();
        executor.update();

        requestor
            .handle()
            .get()
            .unwrap()
            .reject(eyre::eyre!("Timed out"))
            .unwrap();

        let err = interaction.now_or_never().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Timed out");

        executor.update();
        assert_eq!(executor.render_tree(host), "");
    }

    #[test]
    fn effects_released_between_interactions() {
        let mut executor = AppExecutor::new();
        let requestor = Requestor::<u32>::new();

        executor.attach_root(
            InteractionHost::new(|scope: &mut Scope<'_>| {
                scope.use_future(futures::future::pending::<()>(), |_, _| {});

                scope.attach(|scope: &mut Scope<'_>| {
                    scope.use_future(futures::future::pending::<()>(), |_, _| {});
                });
            })
            .with_handle(requestor.handle()),
        );

        executor.update();
        let idle = executor.task_count();

        for i in 0..50 {
            let interaction = requestor.trigger().unwrap();
            executor.update();
            assert_eq!(executor.task_count(), idle + 2);

            requestor.handle().get().unwrap().resolve(i).unwrap();
            executor.update();

            assert_eq!(interaction.now_or_never().unwrap().unwrap(), i);
            assert_eq!(executor.task_count(), idle);
        }
    }

    #[tokio::test]
    async fn await_while_running() {
        init_tracing();

        let mut executor = AppExecutor::new();
        let (requestor, host) = confirm_dialog(&mut executor);

        // Clicks the button with the received label
        let (clicks_tx, clicks_rx) = flume::unbounded::<&'static str>();
        executor.attach_root(move |scope: &mut Scope<'_>| {
            scope.use_stream(clicks_rx.into_stream(), move |scope, label| {
                if let Some(target) = scope.nodes().find(host, |v| v.text() == Some(label)) {
                    scope.send_event(host, &Click { target });
                }
            });
        });

        let interaction = requestor.trigger().unwrap();

        let user = tokio::spawn(async move {
            tokio::task::yield_now().await;
            clicks_tx.send_async("No").await.unwrap();
        });

        let answer = {
            let ui = executor.run();
            futures::pin_mut!(ui);

            match futures::future::select(interaction, ui).await {
                futures::future::Either::Left((answer, _)) => answer.unwrap(),
                futures::future::Either::Right(_) => unreachable!(),
            }
        };

        assert_eq!(answer, "no");
        user.await.unwrap();

        executor.update();
        assert_eq!(executor.render_tree(host), "");
    }
}
