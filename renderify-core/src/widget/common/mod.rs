use crate::{
    events::{Click, EventState},
    tree::NodeId,
    Scope, Widget,
};

use super::WidgetCollection;

/// Displays a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(String);

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl Widget for Text {
    fn mount(self, scope: &mut Scope<'_>) {
        scope.set_text(self.0);
    }
}

/// A labeled button which invokes a function when clicked
pub struct Button<F> {
    label: String,
    on_click: F,
}

impl<F> Button<F>
where
    F: 'static + FnMut() + Send + Sync,
{
    pub fn new(label: impl Into<String>, on_click: F) -> Self {
        Self {
            label: label.into(),
            on_click,
        }
    }
}

impl<F> Widget for Button<F>
where
    F: 'static + FnMut() + Send + Sync,
{
    fn mount(self, scope: &mut Scope<'_>) {
        let mut on_click = self.on_click;

        scope.set_name("Button").set_text(self.label);
        scope.on_event::<Click>(move |id: NodeId, event: &Click| {
            if event.target != id {
                return EventState::Pending;
            }

            tracing::debug!(?id, "Clicked");
            on_click();
            EventState::Handled
        });
    }
}

/// A named group of widgets
pub struct Container<W> {
    name: String,
    children: W,
}

impl<W> Container<W>
where
    W: WidgetCollection,
{
    pub fn new(name: impl Into<String>, children: W) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

impl<W> Widget for Container<W>
where
    W: WidgetCollection,
{
    fn mount(self, scope: &mut Scope<'_>) {
        scope.set_name(self.name);
        self.children.attach(scope);
    }
}
