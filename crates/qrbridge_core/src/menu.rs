use std::fmt;

use serde::{Deserialize, Serialize};

/// Context-menu entries owned by the background process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuItemId {
    #[serde(rename = "QRDecode")]
    Decode,
    #[serde(rename = "QREncodeLink")]
    EncodeLink,
    #[serde(rename = "QREncodeSelection")]
    EncodeSelection,
}

/// Where a menu entry is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuContext {
    Image,
    Link,
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encode,
    Decode,
}

/// Where a click flow finds the value handed to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    /// `srcUrl` of the clicked image, available on the click event.
    ImageSrc,
    /// `linkUrl` of the clicked link, available on the click event.
    LinkUrl,
    /// Current page selection, read by injecting a script into the frame.
    Selection,
}

impl MenuItemId {
    pub const ALL: [MenuItemId; 3] = [
        MenuItemId::Decode,
        MenuItemId::EncodeLink,
        MenuItemId::EncodeSelection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MenuItemId::Decode => "QRDecode",
            MenuItemId::EncodeLink => "QREncodeLink",
            MenuItemId::EncodeSelection => "QREncodeSelection",
        }
    }

    /// Parse a wire id; ids owned by other listeners yield `None`.
    pub fn from_wire(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.as_str() == id)
    }

    pub fn title(self) -> &'static str {
        match self {
            MenuItemId::Decode => "Decode QR code in image",
            MenuItemId::EncodeLink => "Encode link as QR code",
            MenuItemId::EncodeSelection => "Encode selected text as QR code",
        }
    }

    pub fn context(self) -> MenuContext {
        match self {
            MenuItemId::Decode => MenuContext::Image,
            MenuItemId::EncodeLink => MenuContext::Link,
            MenuItemId::EncodeSelection => MenuContext::Selection,
        }
    }

    pub fn operation(self) -> Operation {
        match self {
            MenuItemId::Decode => Operation::Decode,
            MenuItemId::EncodeLink | MenuItemId::EncodeSelection => Operation::Encode,
        }
    }

    pub fn payload_source(self) -> PayloadSource {
        match self {
            MenuItemId::Decode => PayloadSource::ImageSrc,
            MenuItemId::EncodeLink => PayloadSource::LinkUrl,
            MenuItemId::EncodeSelection => PayloadSource::Selection,
        }
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration request for one context-menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub id: MenuItemId,
    pub title: String,
    pub contexts: Vec<MenuContext>,
}

impl MenuEntry {
    pub fn for_item(id: MenuItemId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            contexts: vec![id.context()],
        }
    }
}

/// The full entry set, in registration order.
pub fn default_entries() -> Vec<MenuEntry> {
    MenuItemId::ALL.into_iter().map(MenuEntry::for_item).collect()
}
