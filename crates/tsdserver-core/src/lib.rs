//! # tsdserver-core
//!
//! Request resolution and ES module import rewriting for the tsdserver
//! development server.
//!
//! A request goes through four stages:
//!
//! 1. [`FileResolver`] maps the URL path to a file, trying search
//!    directories, name-mapping candidates and the fallback chain.
//! 2. [`freshness`] answers conditional requests from the file's mtime.
//! 3. The [`transform`] pipeline rewrites import specifiers in `.js` files
//!    through a [`ModuleResolver`], and wraps non-JS resources requested as
//!    `.js` into modules.
//! 4. [`RequestHandler`] assembles the status, headers and body.
//!
//! Nothing here knows about sockets or HTTP frameworks; the CLI crate puts
//! an axum server in front of [`RequestHandler::handle`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use tsdserver_core::{NativeRuntime, Request, RequestHandler, ServerOptions};
//!
//! # async fn run() {
//! let options = ServerOptions {
//!     root: "/srv/app".into(),
//!     ..ServerOptions::default()
//! };
//! let (handler, issues) = RequestHandler::build(options, Arc::new(NativeRuntime)).await;
//! assert!(issues.is_empty());
//! let response = handler.handle(&Request::get("/src/main.js")).await;
//! println!("{}", response.status.code());
//! # }
//! ```

pub mod alias;
pub mod edit;
pub mod error;
pub mod file_resolver;
pub mod freshness;
pub mod handler;
pub mod module_resolver;
pub mod options;
pub mod package_json;
pub mod paths;
pub mod resolved_file;
pub mod runtime;
pub mod transform;

pub use alias::{AliasOutcome, AliasResolver, AliasRule, Find, PredicateMatch, Replace};
pub use error::{CoreError, Result};
pub use file_resolver::FileResolver;
pub use handler::{HandlerResponse, Request, RequestHandler, ResponseBody, Status};
pub use module_resolver::{
    AliasPackageResolver, CompilerOptions, CompilerPathsResolver, CustomResolver,
    ImportDeclaration, ModuleResolution, ModuleResolver,
};
pub use options::{
    ConfigIssue, EcmaVersion, JsSourceType, ModuleStrategy, ParserOptions, ServerOptions,
};
pub use resolved_file::ResolvedFile;
pub use runtime::{FileMetadata, NativeRuntime, Runtime, RuntimeError, RuntimeResult};
pub use transform::{ImportRewriter, ResourceWrapper, TransformPipeline, Transformer};
