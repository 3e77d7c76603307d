mod http;
mod rpc;

pub use self::http::{
    decode_http_result, HttpError, HttpHeaders, HttpRequest, HttpResponse, ValidatedUrl,
    JSON_CONTENT_TYPE, MAX_TIMEOUT_MS,
};
pub use self::rpc::{
    decode, AddCaseNoteArgs, AddEvidenceArgs, CaseIdArgs, Procedure, RemoteCall,
    RemoveEvidenceArgs, Rpc, RpcError, RpcResult, UpdateCaseArgs,
};

pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub rpc: Rpc<Event>,
}
