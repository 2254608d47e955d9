pub(crate) mod session_flow;
