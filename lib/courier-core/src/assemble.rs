//! Request assembly: endpoint descriptor + per-call context → [`Request`].

use std::collections::BTreeMap;

use bytes::Bytes;
use serde_json::Value;
use url::Url;

use crate::{Body, CodecRegistry, Endpoint, Error, Media, Request, RequestContext, Result, wire};

fn apply_request_schema(endpoint: &Endpoint, media: Media) -> Result<Media> {
    let Some(schema) = endpoint.request_schema() else {
        return Ok(media);
    };
    match media {
        Media::Value(value) => schema
            .serialize(value)
            .map(Media::Value)
            .map_err(Error::RequestValidation),
        Media::Text(text) => match schema.serialize(Value::String(text)) {
            Ok(Value::String(text)) => Ok(Media::Text(text)),
            Ok(value) => Ok(Media::Value(value)),
            Err(err) => Err(Error::RequestValidation(err)),
        },
        bytes @ Media::Bytes(_) => Ok(bytes),
    }
}

fn query_pairs(endpoint: &Endpoint, ctx: &RequestContext) -> Vec<(String, String)> {
    let mut query: BTreeMap<&str, &str> = endpoint
        .query()
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    query.extend(
        ctx.query_params()
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );

    let mut pairs: Vec<(String, String)> = query
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    pairs.extend(ctx.projection().iter().map(|(field, include)| {
        let flag = if *include { "1" } else { "0" };
        (format!("{}{field}", wire::PROJECTION_PREFIX), flag.to_string())
    }));

    let paging = endpoint.paging();
    let limit = ctx.paging_limit().or(paging.map(|paging| paging.limit));
    if let Some(limit) = limit {
        let offset = ctx
            .paging_offset()
            .or(paging.map(|paging| paging.offset))
            .unwrap_or_default();
        pairs.push((wire::PAGING_OFFSET.to_string(), offset.to_string()));
        pairs.push((wire::PAGING_LIMIT.to_string(), limit.to_string()));
    }

    pairs
}

/// Build the outbound request for one call.
///
/// The path template is rendered against the context's path parameters
/// and appended to the base URL path. Query parameters and headers take the
/// endpoint defaults first, per-call values overriding them; projection
/// flags and the paging cursor follow in the query string. Raw content goes
/// out verbatim; media goes through the request schema and then the codec
/// registry, which also decides `Content-Type`.
///
/// # Errors
///
/// Returns [`Error::Configuration`] for a missing path parameter (before
/// anything is encoded), [`Error::RequestValidation`] if the request schema
/// rejects the media, and codec errors from
/// [`CodecRegistry::encode_for`].
pub fn assemble(
    base: &Url,
    codecs: &CodecRegistry,
    endpoint: &Endpoint,
    ctx: &RequestContext,
) -> Result<Request<Bytes>> {
    let path = endpoint.path().render(ctx.path_params())?;

    let mut url = base.clone();
    let full_path = format!("{}{path}", base.path().trim_end_matches('/'));
    url.set_path(&full_path);

    let send = ctx.send_type().or(endpoint.send());
    let encoded = match ctx.body().clone() {
        Body::None => None,
        Body::Content(content) => Some(codecs.encode_for(Media::Bytes(content), send)?),
        Body::Media(media) => {
            let media = apply_request_schema(endpoint, media)?;
            Some(codecs.encode_for(media, send)?)
        }
    };

    let mut builder = Request::builder(endpoint.method(), url)
        .query_pairs(query_pairs(endpoint, ctx))
        .headers(endpoint.headers().iter().cloned());
    if let Some(accept) = endpoint.accept() {
        builder = builder.header("Accept", accept);
    }
    builder = builder.headers(ctx.headers().iter().cloned());
    if let Some(accept) = ctx.accept_type() {
        builder = builder.header("Accept", accept);
    }

    if let Some(encoded) = encoded {
        if let Some(content_type) = encoded.content_type {
            builder = builder.header("Content-Type", content_type);
        }
        builder = builder.body(encoded.body);
    }

    let request = builder.build();
    tracing::debug!(
        method = %request.method(),
        url = %request.url(),
        body_bytes = request.body().map_or(0, Bytes::len),
        "assembled request"
    );
    Ok(request)
}
