//! Streaming HTML rewriter.
//!
//! Built on `lol_html`: elements are transformed as the tokenizer reaches
//! them, so the document is never held in memory. The rewriter itself is not
//! `Send`, so streamed responses run it on a blocking worker fed by a bounded
//! channel of upstream chunks; rewritten output is forwarded as soon as it is
//! produced. Every hand-off to the client is bounded in time, so a reader that
//! stalls cannot hold a blocking-pool thread.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use lol_html::errors::RewritingError;
use lol_html::html_content::{ContentType, Element};
use lol_html::{element, HtmlRewriter, Settings};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::rewrite::chrome::{body_script, HEAD_STYLE};
use crate::rewrite::context::RewriteContext;
use crate::rewrite::meta::{meta_edits, MetaEdit};

/// Chunks buffered between upstream, worker and client.
const CHANNEL_DEPTH: usize = 16;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn apply_meta(el: &mut Element<'_, '_>, ctx: &RewriteContext) -> HandlerResult {
    let tag = el.tag_name();
    let edits = meta_edits(&tag, |name| el.get_attribute(name), ctx);
    for edit in edits {
        match edit {
            MetaEdit::SetContent(value) => el.set_attribute("content", &value)?,
            MetaEdit::SetText(text) => el.set_inner_content(&text, ContentType::Text),
            MetaEdit::Remove => el.remove(),
        }
    }
    Ok(())
}

fn settings(ctx: Arc<RewriteContext>) -> Settings<'static, 'static> {
    let title_ctx = ctx.clone();
    let meta_ctx = ctx.clone();
    let body_markup = body_script(&ctx);

    Settings {
        element_content_handlers: vec![
            element!("title", move |el| apply_meta(el, &title_ctx)),
            element!("meta", move |el| apply_meta(el, &meta_ctx)),
            element!("head", |el| {
                el.append(HEAD_STYLE, ContentType::Html);
                Ok(())
            }),
            element!("body", move |el| {
                el.append(&body_markup, ContentType::Html);
                Ok(())
            }),
        ],
        ..Settings::default()
    }
}

/// Rewrite a document delivered as a sequence of chunks.
pub fn rewrite_chunks<I, C>(ctx: Arc<RewriteContext>, chunks: I) -> Result<Vec<u8>, RewritingError>
where
    I: IntoIterator<Item = C>,
    C: AsRef<[u8]>,
{
    let mut output = Vec::new();
    let mut rewriter = HtmlRewriter::new(settings(ctx), |c: &[u8]| output.extend_from_slice(c));
    for chunk in chunks {
        rewriter.write(chunk.as_ref())?;
    }
    rewriter.end()?;
    Ok(output)
}

/// Rewrite a complete document.
pub fn rewrite_html(ctx: Arc<RewriteContext>, input: &[u8]) -> Result<Vec<u8>, RewritingError> {
    rewrite_chunks(ctx, [input])
}

/// Rewrite an upstream byte stream, yielding rewritten chunks.
///
/// An upstream error or a rewriter failure ends the stream with an error item.
/// Output waiting longer than `stall_limit` for the client to take it ends the
/// worker, and with it the upstream read.
pub fn rewrite_stream<S, E>(
    ctx: Arc<RewriteContext>,
    upstream: S,
    stall_limit: Duration,
) -> impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let (in_tx, mut in_rx) = mpsc::channel::<Result<Bytes, String>>(CHANNEL_DEPTH);
    let (out_tx, out_rx) = mpsc::channel::<Result<Bytes, io::Error>>(CHANNEL_DEPTH);
    let handle = Handle::current();

    tokio::spawn(async move {
        let mut upstream = std::pin::pin!(upstream);
        while let Some(item) = upstream.next().await {
            let item = item.map_err(|e| e.to_string());
            let failed = item.is_err();
            if in_tx.send(item).await.is_err() || failed {
                break;
            }
        }
    });

    tokio::task::spawn_blocking(move || {
        let client = ClientSink {
            handle,
            tx: out_tx,
            stall_limit,
        };
        let pending = Rc::new(RefCell::new(Vec::new()));
        let sink = pending.clone();
        let mut rewriter = HtmlRewriter::new(settings(ctx), move |c: &[u8]| {
            sink.borrow_mut().extend_from_slice(c);
        });

        while let Some(item) = in_rx.blocking_recv() {
            let result = match item {
                Ok(chunk) => rewriter
                    .write(&chunk)
                    .map_err(|e| io::Error::other(e.to_string())),
                Err(e) => Err(io::Error::other(format!("upstream body error: {e}"))),
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "HTML rewrite aborted");
                client.flush(&pending);
                client.fail(e);
                return;
            }
            if !client.flush(&pending) {
                return;
            }
        }

        match rewriter.end() {
            Ok(()) => {
                client.flush(&pending);
            }
            Err(e) => {
                tracing::warn!(error = %e, "HTML rewrite failed at end of document");
                client.fail(io::Error::other(e.to_string()));
            }
        }
    });

    ReceiverStream::new(out_rx)
}

/// Worker side of the client channel.
struct ClientSink {
    handle: Handle,
    tx: mpsc::Sender<Result<Bytes, io::Error>>,
    stall_limit: Duration,
}

impl ClientSink {
    /// Hand rewritten output to the client. `false` means the worker should stop.
    fn flush(&self, pending: &RefCell<Vec<u8>>) -> bool {
        let output = std::mem::take(&mut *pending.borrow_mut());
        if output.is_empty() {
            return true;
        }
        self.send(Ok(Bytes::from(output)))
    }

    fn fail(&self, error: io::Error) {
        self.send(Err(error));
    }

    fn send(&self, item: Result<Bytes, io::Error>) -> bool {
        let delivery = tokio::time::timeout(self.stall_limit, self.tx.send(item));
        match self.handle.block_on(delivery) {
            Ok(Ok(())) => true,
            Ok(Err(_)) => {
                tracing::debug!("Client went away, stopping HTML rewrite");
                false
            }
            Err(_) => {
                tracing::warn!(
                    stall_secs = self.stall_limit.as_secs(),
                    "Client stopped reading, abandoning HTML rewrite"
                );
                false
            }
        }
    }
}
