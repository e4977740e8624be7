mod common;

use std::collections::HashMap;

use qrbridge_core::{ClickEvent, MenuItemId, PopupRequest, TabInfo};
use qrbridge_engine::{reply_channel, Background, ClickOutcome, Routed};
use serde_json::json;

use common::{init_logging, standard_codec, FakeHost};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_clicks_each_get_one_reply() {
    init_logging();
    let host = FakeHost::new();
    host.set_selection(Ok(vec![json!("selected text")]));
    let background = Background::new(standard_codec(), host.clone());
    background.initialize().await.unwrap();

    let mut handles = Vec::new();
    for tab in 0..12i64 {
        let id = MenuItemId::ALL[(tab % 3) as usize];
        let event = ClickEvent {
            menu_item_id: id.as_str().to_string(),
            tab: Some(TabInfo { id: tab }),
            link_url: Some(format!("https://example.com/{tab}")),
            src_url: Some("data:,not-an-image".into()),
            ..ClickEvent::default()
        };
        handles.push(background.dispatch_click(event));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), ClickOutcome::Delivered);
    }

    let mut per_tab: HashMap<i64, Vec<MenuItemId>> = HashMap::new();
    for (tab, message) in host.sent() {
        per_tab.entry(tab).or_default().push(message.action);
    }
    assert_eq!(per_tab.len(), 12);
    for (tab, actions) in per_tab {
        assert_eq!(actions, vec![MenuItemId::ALL[(tab % 3) as usize]]);
    }
}

#[tokio::test]
async fn popup_requests_are_dispatched_independently() {
    let host = FakeHost::new();
    let background = Background::new(standard_codec(), host);

    let (ok_reply, ok_rx) = reply_channel();
    let (err_reply, err_rx) = reply_channel();
    let (foreign_reply, foreign_rx) = reply_channel();

    let ok = background.dispatch_request(PopupRequest::get_qr_code("hello"), ok_reply);
    let err = background.dispatch_request(PopupRequest::get_qr_code(""), err_reply);
    let foreign = background.dispatch_request(
        serde_json::from_value(json!({ "action": "Other" })).unwrap(),
        foreign_reply,
    );

    assert!(matches!(ok.await.unwrap(), Routed::Handled));
    assert!(matches!(err.await.unwrap(), Routed::Handled));
    assert!(matches!(foreign.await.unwrap(), Routed::Ignored(_)));

    assert!(ok_rx.wait().await.unwrap().is_ok());
    assert!(!err_rx.wait().await.unwrap().is_ok());
    assert_eq!(foreign_rx.wait().await, None);
}

#[tokio::test]
async fn reset_clears_registered_entries() {
    let host = FakeHost::new();
    let background = Background::new(standard_codec(), host.clone());
    background.initialize().await.unwrap();
    background.reset().await.unwrap();
    assert!(host.menu_ids().is_empty());
}
