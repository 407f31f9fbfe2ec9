//! Request orchestration, independent of any HTTP framework.
//!
//! The server layer extracts method, path and the two conditional headers,
//! calls [`RequestHandler::handle`], and writes the returned
//! [`HandlerResponse`]. Exactly one response comes back for every request;
//! errors have already been turned into a `500` by then.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::file_resolver::FileResolver;
use crate::freshness;
use crate::module_resolver::{
    AliasPackageResolver, CompilerOptions, CompilerPathsResolver, ModuleResolver,
};
use crate::options::{ConfigIssue, ModuleStrategy, ServerOptions};
use crate::runtime::Runtime;
use crate::transform::{ImportRewriter, ResourceWrapper, TransformPipeline};

pub const CACHE_CONTROL: &str = "no-cache, max-age=0";

/// The parts of an HTTP request the handler looks at.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub method: &'a str,
    /// URL path, still percent-encoded, query string removed
    pub path: &'a str,
    pub if_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

impl<'a> Request<'a> {
    pub fn get(path: &'a str) -> Self {
        Self {
            method: "GET",
            path,
            if_match: None,
            if_modified_since: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotModified,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NotModified => 304,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::InternalServerError => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Empty,
    /// Transformed content or an error message
    Text(String),
    /// Untouched file, to be streamed from disk
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: Status,
    pub headers: Vec<(&'static str, String)>,
    pub body: ResponseBody,
}

impl HandlerResponse {
    fn new(status: Status) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: ResponseBody::Empty,
        }
    }

    fn text(status: Status, text: String) -> Self {
        Self {
            body: ResponseBody::Text(text),
            ..Self::new(status)
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RequestHandler {
    welcome: String,
    file_resolver: FileResolver,
    transformers: TransformPipeline,
}

impl RequestHandler {
    /// Build the handler once at startup.
    ///
    /// A tsconfig that cannot be loaded does not stop the server: the
    /// compiler strategy continues with default compiler options and the
    /// problem is returned as an issue.
    pub async fn build(options: ServerOptions, runtime: Arc<dyn Runtime>) -> (Self, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let root = options.root.clone();
        let mut directories = options.directories.clone();

        let resolver: Arc<dyn ModuleResolver> = match options.module_strategy {
            ModuleStrategy::AliasPackage(aliases) => Arc::new(AliasPackageResolver::new(
                root.clone(),
                aliases,
                Arc::clone(&runtime),
            )),
            ModuleStrategy::CompilerPaths { tsconfig } => {
                let compiler = load_compiler_options(runtime.as_ref(), &root.join(&tsconfig), &mut issues).await;
                directories.push(compiler.out_dir_path());
                Arc::new(CompilerPathsResolver::new(
                    root.clone(),
                    compiler,
                    Arc::clone(&runtime),
                ))
            }
            ModuleStrategy::Custom(resolver) => resolver,
        };

        let file_resolver = FileResolver::new(&root, &directories, Arc::clone(&runtime))
            .with_name_mapping(options.map_file_name)
            .with_fallback(options.fallback)
            .with_js_suffix_fallback(options.wrap_js_resources);

        let mut transformers = TransformPipeline::new();
        if options.update_js_import {
            transformers.push(Arc::new(ImportRewriter::new(resolver, options.parser)));
        }
        if options.wrap_js_resources {
            transformers.push(Arc::new(ResourceWrapper));
        }

        let handler = Self {
            welcome: options.welcome,
            file_resolver,
            transformers,
        };
        (handler, issues)
    }

    pub async fn handle(&self, request: &Request<'_>) -> HandlerResponse {
        if request.method != "GET" {
            let mut response = HandlerResponse::new(Status::MethodNotAllowed);
            response.headers.push(("allow", "GET".to_string()));
            return response;
        }

        match self.serve(request).await {
            Ok(response) => {
                tracing::debug!(path = request.path, status = response.status.code(), "Handled request");
                response
            }
            Err(err) => {
                tracing::error!(path = request.path, "Error handling request: {}", err);
                HandlerResponse::text(Status::InternalServerError, format!("Server error: {err}"))
            }
        }
    }

    async fn serve(&self, request: &Request<'_>) -> Result<HandlerResponse> {
        let path = extract_path(request.path, &self.welcome)?;

        let Some(mut file) = self.file_resolver.resolve(&path).await? else {
            tracing::info!("Resource not found \"{}\"", path);
            return Ok(HandlerResponse::text(Status::NotFound, format!("{path} not found")));
        };

        if freshness::is_up_to_date(file.modified_ms(), request.if_match, request.if_modified_since) {
            return Ok(HandlerResponse::new(Status::NotModified));
        }

        self.transformers.run(&mut file).await?;

        let mut response = HandlerResponse::new(Status::Ok);
        if let Some(mime) = mime_guess::from_path(&file.requested_path).first() {
            response.headers.push(("content-type", mime.to_string()));
        }
        let modified = file.modified_ms();
        response
            .headers
            .push(("last-modified", freshness::format_http_date(modified)));
        response.headers.push(("etag", modified.to_string()));
        response
            .headers
            .push(("cache-control", CACHE_CONTROL.to_string()));

        let disk_file = file.file.clone();
        response.body = match file.into_content() {
            Some(content) => ResponseBody::Text(content),
            None => ResponseBody::File(disk_file),
        };
        Ok(response)
    }
}

async fn load_compiler_options(
    runtime: &dyn Runtime,
    path: &Path,
    issues: &mut Vec<ConfigIssue>,
) -> CompilerOptions {
    match CompilerOptions::load(runtime, path).await {
        Ok(options) => options,
        Err(err) => {
            issues.push(ConfigIssue::new(
                "moduleResolver.tsconfig",
                format!("{err}; using default compiler options"),
            ));
            CompilerOptions::default()
        }
    }
}

/// Strip one leading `/` and percent-decode; an empty path is the welcome file.
pub fn extract_path(raw: &str, welcome: &str) -> Result<String> {
    let trimmed = raw.strip_prefix('/').unwrap_or(raw);
    let decoded = urlencoding::decode(trimmed).map_err(|e| CoreError::InvalidRequestPath {
        path: raw.to_string(),
        reason: e.to_string(),
    })?;
    if decoded.is_empty() {
        Ok(welcome.to_string())
    } else {
        Ok(decoded.into_owned())
    }
}
