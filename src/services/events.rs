// Session Events
// Hooks the API client calls when the session changes

/// Receives session side effects from the API client.
///
/// `unauthorized` fires after any 401, once the stored credentials are gone.
/// The argument is the route the user should be sent to for a fresh login.
pub trait SessionListener: Send + Sync {
    fn unauthorized(&self, login_route: &str);
}

pub struct NoopSessionListener;

impl SessionListener for NoopSessionListener {
    fn unauthorized(&self, _login_route: &str) {}
}

/// Adapts a closure into a `SessionListener`
pub struct FnSessionListener<F>(pub F);

impl<F> SessionListener for FnSessionListener<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn unauthorized(&self, login_route: &str) {
        (self.0)(login_route)
    }
}
