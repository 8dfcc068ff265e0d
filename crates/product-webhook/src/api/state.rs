use crate::api::service::Dispatcher;

pub(crate) struct ApiServerState {
    pub(crate) dispatcher: Dispatcher,
}
