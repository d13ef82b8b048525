//! Session gate for protected views.
//!
//! [`Gated`] wraps any [`View`]. Each render reads the live session flag:
//! when it is false the wrapped view is not rendered at all and a redirect to
//! the login page is returned instead.

use tokio::sync::watch;

use crate::session::SessionFlag;

/// Path unauthenticated visitors are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Something that renders output from props.
pub trait View {
    /// Input to a render.
    type Props;
    /// Rendered result.
    type Output;

    /// Renders the view.
    fn render(&self, props: &Self::Props) -> Self::Output;
}

/// Outcome of rendering a gated view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision<T> {
    /// The flag is set; the wrapped view's output, unchanged.
    Render(T),
    /// The flag is not set; go here instead.
    Redirect {
        /// Target path.
        to: &'static str,
    },
}

impl<T> GateDecision<T> {
    /// Returns the rendered output, if any.
    pub fn rendered(self) -> Option<T> {
        match self {
            Self::Render(output) => Some(output),
            Self::Redirect { .. } => None,
        }
    }
}

/// A view that only renders while someone is logged in.
#[derive(Debug, Clone)]
pub struct Gated<V> {
    inner: V,
    session: watch::Receiver<SessionFlag>,
}

impl<V: View> Gated<V> {
    /// Wraps `inner`, reading the flag from `session` on every render.
    pub const fn new(inner: V, session: watch::Receiver<SessionFlag>) -> Self {
        Self { inner, session }
    }

    /// The wrapped view.
    pub const fn inner(&self) -> &V {
        &self.inner
    }
}

impl<V: View> View for Gated<V> {
    type Props = V::Props;
    type Output = GateDecision<V::Output>;

    fn render(&self, props: &Self::Props) -> Self::Output {
        let authenticated = self.session.borrow().is_authenticated;
        if authenticated {
            GateDecision::Render(self.inner.render(props))
        } else {
            tracing::debug!("Gate closed, redirecting to login");
            GateDecision::Redirect { to: LOGIN_PATH }
        }
    }
}
