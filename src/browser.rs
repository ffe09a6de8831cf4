//! Thin wrappers over the browser APIs the app needs.

use std::future::Future;
use std::time::Duration;

use futures::channel::oneshot;
use leptos::prelude::set_timeout;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, HtmlAnchorElement, Url};

use crate::error::{ExportError, UploadError};
use crate::identity::StageTimer;

pub fn now_ms() -> f64 {
	js_sys::Date::now()
}

/// `setTimeout`-backed stage pacing.
pub struct BrowserTimer;

impl StageTimer for BrowserTimer {
	fn pause(&self, ms: u32) -> impl Future<Output = ()> {
		let (tx, rx) = oneshot::channel::<()>();
		set_timeout(
			move || {
				let _ = tx.send(());
			},
			Duration::from_millis(ms as u64),
		);
		async move {
			let _ = rx.await;
		}
	}
}

pub async fn read_file(file: File) -> Result<Vec<u8>, UploadError> {
	let unreadable = |e: JsValue| UploadError::Unreadable {
		file: file.name(),
		reason: format!("{e:?}"),
	};
	let buffer = JsFuture::from(file.array_buffer()).await.map_err(unreadable)?;
	Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Hand `contents` to the browser as a JSON download named `file_name`.
pub fn download_json(file_name: &str, contents: &str) -> Result<(), ExportError> {
	let browser = |e: JsValue| ExportError::Browser(format!("{e:?}"));

	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let parts = js_sys::Array::of1(&JsValue::from_str(contents));
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(browser)?;
	let url = Url::create_object_url_with_blob(&blob).map_err(browser)?;

	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| ExportError::Browser("no document".into()))?;
	let anchor: HtmlAnchorElement = document
		.create_element("a")
		.map_err(browser)?
		.dyn_into()
		.map_err(|_| ExportError::Browser("anchor element expected".into()))?;
	anchor.set_href(&url);
	anchor.set_download(file_name);
	anchor.click();

	Url::revoke_object_url(&url).map_err(browser)
}
