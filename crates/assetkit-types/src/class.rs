//! Numeric class tags and their capability classification.
//!
//! Objects carry a numeric class tag. Callers never switch on raw tags;
//! they ask [`ClassId::capabilities`] what an object can take part in.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Numeric type tag of an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub u32);

impl ClassId {
    pub const GAME_OBJECT: ClassId = ClassId(1);
    pub const COMPONENT: ClassId = ClassId(2);
    pub const TRANSFORM: ClassId = ClassId(4);
    pub const CAMERA: ClassId = ClassId(20);
    pub const MATERIAL: ClassId = ClassId(21);
    pub const MESH_RENDERER: ClassId = ClassId(23);
    pub const TEXTURE_2D: ClassId = ClassId(28);
    pub const MESH_FILTER: ClassId = ClassId(33);
    pub const MESH: ClassId = ClassId(43);
    pub const SHADER: ClassId = ClassId(48);
    pub const TEXT_ASSET: ClassId = ClassId(49);
    pub const RIGIDBODY: ClassId = ClassId(54);
    pub const BOX_COLLIDER: ClassId = ClassId(65);
    pub const AUDIO_SOURCE: ClassId = ClassId(82);
    pub const ANIMATOR: ClassId = ClassId(95);
    pub const LIGHT: ClassId = ClassId(108);
    pub const MONO_BEHAVIOUR: ClassId = ClassId(114);
    pub const MONO_SCRIPT: ClassId = ClassId(115);
    pub const SPRITE: ClassId = ClassId(213);
    pub const CANVAS_RENDERER: ClassId = ClassId(222);
    pub const CANVAS: ClassId = ClassId(223);
    pub const RECT_TRANSFORM: ClassId = ClassId(224);

    /// Capability set of this class.
    ///
    /// Transforms take part in the parent/child hierarchy; game objects own
    /// the display name and the component list. Every other class has no
    /// hierarchy role.
    pub fn capabilities(&self) -> Capabilities {
        match *self {
            Self::TRANSFORM | Self::RECT_TRANSFORM => Capabilities::PARENT_CHILD,
            Self::GAME_OBJECT => Capabilities::DISPLAY_NAME | Capabilities::COMPONENTS,
            _ => Capabilities::NONE,
        }
    }

    /// Returns `true` if objects of this class carry parent/child links.
    pub fn is_spatial(&self) -> bool {
        self.capabilities().contains(Capabilities::PARENT_CHILD)
    }

    /// Returns `true` if objects of this class own a name and components.
    pub fn is_display(&self) -> bool {
        self.capabilities().contains(Capabilities::DISPLAY_NAME)
    }

    /// Human-readable class name for well-known tags.
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::GAME_OBJECT => "GameObject",
            Self::COMPONENT => "Component",
            Self::TRANSFORM => "Transform",
            Self::CAMERA => "Camera",
            Self::MATERIAL => "Material",
            Self::MESH_RENDERER => "MeshRenderer",
            Self::TEXTURE_2D => "Texture2D",
            Self::MESH_FILTER => "MeshFilter",
            Self::MESH => "Mesh",
            Self::SHADER => "Shader",
            Self::TEXT_ASSET => "TextAsset",
            Self::RIGIDBODY => "Rigidbody",
            Self::BOX_COLLIDER => "BoxCollider",
            Self::AUDIO_SOURCE => "AudioSource",
            Self::ANIMATOR => "Animator",
            Self::LIGHT => "Light",
            Self::MONO_BEHAVIOUR => "MonoBehaviour",
            Self::MONO_SCRIPT => "MonoScript",
            Self::SPRITE => "Sprite",
            Self::CANVAS_RENDERER => "CanvasRenderer",
            Self::CANVAS => "Canvas",
            Self::RECT_TRANSFORM => "RectTransform",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Class{}", self.0),
        }
    }
}

impl From<u32> for ClassId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

bitflags! {
    /// The hierarchy roles a class can play.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Has a parent reference and an ordered list of child references.
        const PARENT_CHILD = 1;
        /// Owns a human-readable name.
        const DISPLAY_NAME = 1 << 1;
        /// Owns an ordered component list.
        const COMPONENTS = 1 << 2;
    }
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities::empty();
}
