#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex, Once};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use qrbridge_core::{MenuEntry, MenuItemId, ScriptRequest, TabId, TabMessage};
use qrbridge_engine::{
    CodecService, HostError, MenuRegistry, ScriptInjector, StandardQrEngine, TabMessenger,
};
use serde_json::Value;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(bridge_logging::initialize_for_tests);
}

pub fn standard_codec() -> CodecService {
    CodecService::with_engine(Arc::new(StandardQrEngine::default()))
}

/// A plain white PNG that contains no QR symbol.
pub fn blank_png_data_url() -> String {
    let img = GrayImage::from_pixel(64, 64, Luma([255u8]));
    let mut png = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// In-memory host recording every platform call.
#[derive(Default)]
pub struct FakeHost {
    menu: Mutex<Vec<MenuEntry>>,
    fail_create_on: Mutex<Option<MenuItemId>>,
    sent: Mutex<Vec<(TabId, TabMessage)>>,
    closed_tabs: Mutex<Vec<TabId>>,
    selection: Mutex<Option<Result<Vec<Value>, HostError>>>,
    scripts: Mutex<Vec<ScriptRequest>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_create_on(&self, id: MenuItemId) {
        *self.fail_create_on.lock().unwrap() = Some(id);
    }

    pub fn close_tab(&self, tab_id: TabId) {
        self.closed_tabs.lock().unwrap().push(tab_id);
    }

    pub fn set_selection(&self, result: Result<Vec<Value>, HostError>) {
        *self.selection.lock().unwrap() = Some(result);
    }

    pub fn menu_ids(&self) -> Vec<MenuItemId> {
        self.menu.lock().unwrap().iter().map(|e| e.id).collect()
    }

    pub fn sent(&self) -> Vec<(TabId, TabMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn scripts(&self) -> Vec<ScriptRequest> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MenuRegistry for FakeHost {
    async fn remove_all(&self) -> Result<(), HostError> {
        self.menu.lock().unwrap().clear();
        Ok(())
    }

    async fn create(&self, entry: &MenuEntry) -> Result<(), HostError> {
        if *self.fail_create_on.lock().unwrap() == Some(entry.id) {
            return Err(HostError::Platform(format!("duplicate id {}", entry.id)));
        }
        self.menu.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl TabMessenger for FakeHost {
    async fn send_to_tab(&self, tab_id: TabId, message: TabMessage) -> Result<(), HostError> {
        if self.closed_tabs.lock().unwrap().contains(&tab_id) {
            return Err(HostError::TabClosed(tab_id));
        }
        self.sent.lock().unwrap().push((tab_id, message));
        Ok(())
    }
}

#[async_trait::async_trait]
impl ScriptInjector for FakeHost {
    async fn execute_script(&self, request: ScriptRequest) -> Result<Vec<Value>, HostError> {
        self.scripts.lock().unwrap().push(request);
        self.selection
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
