// Chunked JSON streaming - length-prefixed frames, each optionally Brotli-compressed
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use serde::Serialize;
use std::future::Future;
use tokio::sync::watch;

pub const FRAME_CONTENT_TYPE: &str = "application/x-length-prefixed-json";

/// Create a chunked streaming response from a stream of serializable frames
pub fn chunked_json_stream<S, T>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let byte_stream = stream.then(move |frame| serialize_frame(frame, compress));

    // No Content-Encoding header: frames are compressed one by one, not the HTTP body
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, FRAME_CONTENT_TYPE)
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single frame: 4-byte big-endian length, then the payload
pub async fn serialize_frame<T: Serialize>(
    frame: T,
    compress: bool,
) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&frame)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream the current value of `rx` and then every change, mapped through `render`,
/// until the sender is dropped or `stop` resolves
pub fn stream_from_watch<S, T, F, Stop>(
    mut rx: watch::Receiver<S>,
    render: F,
    compress: bool,
    stop: Stop,
) -> impl IntoResponse
where
    S: Send + Sync + 'static,
    T: Serialize + Send + 'static,
    F: Fn(&S) -> T + Send + 'static,
    Stop: Future<Output = ()> + Send + 'static,
{
    let stream = async_stream::stream! {
        loop {
            let frame = {
                let current = rx.borrow_and_update();
                render(&current)
            };
            yield frame;
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    match chunked_json_stream(stream.take_until(stop), compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_frame_layout() {
        let frame = serialize_frame(json!({"a": 1}), false).await.unwrap();
        let payload = br#"{"a":1}"#;

        assert_eq!(&frame[..4], &(payload.len() as u32).to_be_bytes());
        assert_eq!(&frame[4..], payload);
    }

    #[tokio::test]
    async fn test_watch_stream_emits_current_then_changes() {
        let (tx, rx) = watch::channel(1u32);
        let response = stream_from_watch(
            rx,
            |v| json!({"value": *v}),
            false,
            std::future::pending(),
        )
        .into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], FRAME_CONTENT_TYPE);

        let mut body = response.into_body().into_data_stream();
        let first = body.next().await.unwrap().unwrap();
        assert_eq!(&first[4..], br#"{"value":1}"#);

        tx.send(2).unwrap();
        let second = body.next().await.unwrap().unwrap();
        assert_eq!(&second[4..], br#"{"value":2}"#);

        drop(tx);
        assert!(body.next().await.is_none());
    }

    #[tokio::test]
    async fn test_watch_stream_ends_on_stop() {
        let (_tx, rx) = watch::channel(1u32);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let stop = async move {
            let _ = stop_rx.await;
        };
        let response = stream_from_watch(rx, |v| json!({"value": *v}), false, stop).into_response();

        let mut body = response.into_body().into_data_stream();
        assert!(body.next().await.is_some());

        stop_tx.send(()).unwrap();
        assert!(body.next().await.is_none());
    }
}
