use std::io::BufRead;

use eyre::{eyre, Report};
use futures::future::{select, Either};
use renderify_core::{
    events::Click,
    tree::NodeId,
    use_response,
    widget::{Button, Container, Text},
    AppExecutor, Completion, Interaction, InteractionHost, Requestor, Scope, Widget,
};
use tracing_subscriber::{prelude::*, EnvFilter};
use tracing_tree::HierarchicalLayer;

/// Asks whether to delete `path`.
///
/// The buttons settle the interaction through the completion handed to the builder.
fn delete_dialog(path: &'static str, confirm: &Requestor<bool>) -> InteractionHost<bool> {
    InteractionHost::builder(move |scope: &mut Scope<'_>, completion: &Completion<bool>| {
        let yes = completion.clone();
        let no = completion.clone();

        scope.attach(Container::new(
            "Dialog",
            (
                Text::new(format!("Delete {path}?")),
                Button::new("yes", move || {
                    yes.resolve(true).ok();
                }),
                Button::new("no", move || {
                    no.resolve(false).ok();
                }),
            ),
        ));
    })
    .with_handle(confirm.handle())
}

fn rename_dialog(rename: &Requestor<String>) -> InteractionHost<String> {
    InteractionHost::new(|scope: &mut Scope<'_>| {
        scope.attach(Container::new(
            "Dialog",
            (Text::new("Keep it under a new name instead?"), NameChoices),
        ));
    })
    .with_handle(rename.handle())
}

/// Nested inside the rename dialog without being handed the callbacks
struct NameChoices;

impl Widget for NameChoices {
    fn mount(self, scope: &mut Scope<'_>) {
        let response = use_response::<String, Report>(scope);

        for name in ["notes.old.txt", "archive/notes.txt"] {
            let response = response.clone();
            scope.attach(Button::new(name, move || {
                response.resolve(name.to_string()).ok();
            }));
        }

        scope.attach(Button::new("cancel", move || {
            response.reject(eyre!("Rename cancelled")).ok();
        }));
    }
}

/// Clicks the button whose label matches each line typed on stdin
struct Keyboard {
    root: NodeId,
    lines: flume::Receiver<String>,
}

impl Widget for Keyboard {
    fn mount(self, scope: &mut Scope<'_>) {
        let root = self.root;

        scope.use_stream(self.lines.into_stream(), move |scope, line| {
            let target = scope
                .nodes()
                .find(root, |v| v.name() == Some("Button") && v.text() == Some(line.as_str()));

            match target {
                Some(target) => {
                    scope.send_event(root, &Click { target });
                }
                None => tracing::warn!(%line, "No button with that label"),
            }
        });
    }
}

fn read_stdin() -> flume::Receiver<String> {
    let (tx, rx) = flume::unbounded();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line.trim().to_string()).is_err() {
                break;
            }
        }
    });

    rx
}

/// Drives the UI until the interaction settles
async fn ask<T>(
    executor: &mut AppExecutor,
    root: NodeId,
    interaction: Interaction<T>,
) -> eyre::Result<T> {
    executor.update();
    print!("{}", executor.render_tree(root));

    let ui = executor.run();
    futures::pin_mut!(ui);

    match select(interaction, ui).await {
        Either::Left((outcome, _)) => outcome,
        Either::Right(_) => unreachable!("The ui loop never exits"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            HierarchicalLayer::new(4)
                .with_indent_lines(true)
                .with_verbose_entry(true),
        )
        .init();

    let mut executor = AppExecutor::new();
    let confirm = Requestor::<bool>::new();
    let rename = Requestor::<String>::new();

    let root = executor.attach_root(|scope: &mut Scope<'_>| {
        scope.set_name("Files");
    });

    executor.attach(root, delete_dialog("notes.txt", &confirm));
    executor.attach(root, rename_dialog(&rename));
    executor.attach(
        root,
        Keyboard {
            root,
            lines: read_stdin(),
        },
    );

    if ask(&mut executor, root, confirm.trigger()?).await? {
        println!("Deleted notes.txt");
        return Ok(());
    }

    match ask(&mut executor, root, rename.trigger()?).await {
        Ok(name) => println!("Renamed notes.txt to {name}"),
        Err(err) => println!("{err}"),
    }

    executor.update();
    print!("{}", executor.render_tree(root));

    Ok(())
}
