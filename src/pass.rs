// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Render pass targets and descriptions.

A [`Framebuffer`] names the textures a pass renders into. A [`RenderPassDescription`]
says what happens to each of them when the pass begins (load, clear, or don't care) and
ends (store, resolve, or discard).

```
use slots_and_passes::pass::{LoadAction, RenderPassDescription, RgbaFloat, StoreAction};
# use slots_and_passes::device::{Device, DeviceFeatures, DeviceLimits};
# use slots_and_passes::pass::{FramebufferAttachment, FramebufferDescription};
# use slots_and_passes::bindings::resources::TextureDescription;
# use slots_and_passes::bindings::visible_to::TextureUsage;
# use slots_and_passes::pixel_formats::PixelFormat;
# let device = Device::new(DeviceFeatures::all(), DeviceLimits::default());
# let color = device.factory().create_texture(TextureDescription::texture_2d(64, 64, PixelFormat::RGBA8UNorm, TextureUsage::RENDER_TARGET), "color").unwrap();
# let framebuffer = device.factory().create_framebuffer(FramebufferDescription::new(vec![FramebufferAttachment::new(&color)], None), "fb").unwrap();
let pass = RenderPassDescription::new(&framebuffer, LoadAction::Clear, StoreAction::Store, RgbaFloat::RED, 1.0);
assert_eq!(pass.color_attachments.len(), 1);
```
*/

use crate::bindings::resources::{ResourceId, SampleCount, Texture};
use crate::pixel_formats::PixelFormat;
use std::sync::Arc;

/// An RGBA color with float channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RgbaFloat {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl RgbaFloat {
    pub const RED: RgbaFloat = RgbaFloat::new(1.0, 0.0, 0.0, 1.0);
    pub const BLACK: RgbaFloat = RgbaFloat::new(0.0, 0.0, 0.0, 1.0);
    pub const CLEAR: RgbaFloat = RgbaFloat::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        RgbaFloat { r, g, b, a }
    }
}

/// A viewport in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub const fn new(x: f32, y: f32, width: f32, height: f32, min_depth: f32, max_depth: f32) -> Self {
        Viewport {
            x,
            y,
            width,
            height,
            min_depth,
            max_depth,
        }
    }
}

/// A scissor rectangle in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        ScissorRect {
            x,
            y,
            width,
            height,
        }
    }
}

/// What happens to an attachment's contents when a pass begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadAction {
    DontCare,
    Load,
    Clear,
}

/// What happens to an attachment's contents when a pass ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreAction {
    DontCare,
    Store,
    Resolve,
    StoreAndResolve,
}

impl StoreAction {
    pub fn stores(self) -> bool {
        matches!(self, StoreAction::Store | StoreAction::StoreAndResolve)
    }
    pub fn resolves(self) -> bool {
        matches!(self, StoreAction::Resolve | StoreAction::StoreAndResolve)
    }
}

/// The attachment formats and sample count a pipeline renders into.
///
/// A graphics pipeline can only draw into a framebuffer with an equal output description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputDescription {
    pub color_formats: Vec<PixelFormat>,
    pub depth_format: Option<PixelFormat>,
    pub sample_count: SampleCount,
}

/// One texture layer and mip level attached to a framebuffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FramebufferAttachment {
    pub target: Texture,
    pub array_layer: u32,
    pub mip_level: u32,
}

impl FramebufferAttachment {
    pub fn new(target: &Texture) -> Self {
        FramebufferAttachment {
            target: target.clone(),
            array_layer: 0,
            mip_level: 0,
        }
    }
}

/// Describes a framebuffer to create.
#[derive(Debug, Clone)]
pub struct FramebufferDescription {
    pub color_targets: Vec<FramebufferAttachment>,
    pub depth_target: Option<FramebufferAttachment>,
}

impl FramebufferDescription {
    pub fn new(
        color_targets: Vec<FramebufferAttachment>,
        depth_target: Option<FramebufferAttachment>,
    ) -> Self {
        FramebufferDescription {
            color_targets,
            depth_target,
        }
    }
}

#[derive(Debug)]
struct FramebufferShared {
    id: ResourceId,
    name: String,
    description: FramebufferDescription,
    width: u32,
    height: u32,
    output: OutputDescription,
}

/// A set of render targets.
#[derive(Debug, Clone)]
pub struct Framebuffer(Arc<FramebufferShared>);

impl PartialEq for Framebuffer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Framebuffer {}

impl Framebuffer {
    /// Builds a framebuffer; its size is the size of the first attachment at its mip level.
    pub(crate) fn new(description: FramebufferDescription, name: &str) -> Self {
        let first = description
            .color_targets
            .first()
            .or(description.depth_target.as_ref());
        let (width, height) = first
            .map(|a| {
                let (w, h, _) = a.target.mip_dimensions(a.mip_level);
                (w, h)
            })
            .unwrap_or((0, 0));
        let sample_count = first
            .map(|a| a.target.sample_count())
            .unwrap_or(SampleCount::One);
        let output = OutputDescription {
            color_formats: description
                .color_targets
                .iter()
                .map(|a| a.target.format())
                .collect(),
            depth_format: description.depth_target.as_ref().map(|a| a.target.format()),
            sample_count,
        };
        Framebuffer(Arc::new(FramebufferShared {
            id: ResourceId::next(),
            name: name.to_string(),
            description,
            width,
            height,
            output,
        }))
    }
    pub fn id(&self) -> ResourceId {
        self.0.id
    }
    pub fn name(&self) -> &str {
        &self.0.name
    }
    pub fn width(&self) -> u32 {
        self.0.width
    }
    pub fn height(&self) -> u32 {
        self.0.height
    }
    pub fn color_targets(&self) -> &[FramebufferAttachment] {
        &self.0.description.color_targets
    }
    pub fn depth_target(&self) -> Option<&FramebufferAttachment> {
        self.0.description.depth_target.as_ref()
    }
    pub fn output_description(&self) -> &OutputDescription {
        &self.0.output
    }
    /// A viewport covering the whole framebuffer.
    pub fn full_viewport(&self) -> Viewport {
        Viewport::new(0.0, 0.0, self.0.width as f32, self.0.height as f32, 0.0, 1.0)
    }
    /// A scissor rect covering the whole framebuffer.
    pub fn full_scissor_rect(&self) -> ScissorRect {
        ScissorRect::new(0, 0, self.0.width, self.0.height)
    }
    /// Number of viewports a pass over this framebuffer has: one per color target, at least one.
    pub fn viewport_count(&self) -> usize {
        self.0.description.color_targets.len().max(1)
    }
}

/// Begin/end behavior of one color attachment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAttachmentAction {
    pub load: LoadAction,
    pub store: StoreAction,
    pub clear_color: RgbaFloat,
}

/// Begin/end behavior of the depth/stencil attachment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthAttachmentAction {
    pub load: LoadAction,
    pub store: StoreAction,
    pub clear_depth: f32,
    pub stencil_load: LoadAction,
    pub stencil_store: StoreAction,
    pub clear_stencil: u8,
}

/// Everything a backend needs to begin a render pass.
#[derive(Debug, Clone)]
pub struct RenderPassDescription {
    pub framebuffer: Framebuffer,
    /// One entry per color target of `framebuffer`.
    pub color_attachments: Vec<ColorAttachmentAction>,
    /// Present when `framebuffer` has a depth target.
    pub depth_attachment: Option<DepthAttachmentAction>,
    /// Single-sampled textures receiving the resolve of the matching color target.
    pub resolve_targets: Vec<Texture>,
}

impl RenderPassDescription {
    /// Applies the same load/store action to every attachment.
    pub fn new(
        framebuffer: &Framebuffer,
        load: LoadAction,
        store: StoreAction,
        clear_color: RgbaFloat,
        clear_depth: f32,
    ) -> Self {
        let color_attachments = framebuffer
            .color_targets()
            .iter()
            .map(|_| ColorAttachmentAction {
                load,
                store,
                clear_color,
            })
            .collect();
        let depth_attachment = framebuffer.depth_target().map(|target| {
            let has_stencil = target.target.format().has_stencil();
            DepthAttachmentAction {
                load,
                store,
                clear_depth,
                stencil_load: if has_stencil { load } else { LoadAction::DontCare },
                stencil_store: if has_stencil { store } else { StoreAction::DontCare },
                clear_stencil: 0,
            }
        });
        RenderPassDescription {
            framebuffer: framebuffer.clone(),
            color_attachments,
            depth_attachment,
            resolve_targets: Vec::new(),
        }
    }

    /// Loads every attachment and stores it afterwards.
    pub fn load(framebuffer: &Framebuffer) -> Self {
        Self::new(
            framebuffer,
            LoadAction::Load,
            StoreAction::Store,
            RgbaFloat::CLEAR,
            1.0,
        )
    }

    pub fn with_resolve_targets(mut self, resolve_targets: Vec<Texture>) -> Self {
        self.resolve_targets = resolve_targets;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::resources::TextureDescription;
    use crate::bindings::visible_to::TextureUsage;

    fn texture(format: PixelFormat, width: u32, height: u32) -> Texture {
        Texture::new(
            TextureDescription::texture_2d(
                width,
                height,
                format,
                TextureUsage::RENDER_TARGET | TextureUsage::DEPTH_STENCIL,
            ),
            "t",
        )
    }

    #[test]
    fn test_output_description() {
        let fb = Framebuffer::new(
            FramebufferDescription::new(
                vec![
                    FramebufferAttachment::new(&texture(PixelFormat::RGBA8UNorm, 32, 16)),
                    FramebufferAttachment::new(&texture(PixelFormat::R32Float, 32, 16)),
                ],
                Some(FramebufferAttachment::new(&texture(PixelFormat::D32Float, 32, 16))),
            ),
            "fb",
        );
        assert_eq!((fb.width(), fb.height()), (32, 16));
        assert_eq!(fb.viewport_count(), 2);
        assert_eq!(
            fb.output_description().color_formats,
            vec![PixelFormat::RGBA8UNorm, PixelFormat::R32Float]
        );
        assert_eq!(fb.output_description().depth_format, Some(PixelFormat::D32Float));
    }

    #[test]
    fn test_pass_actions_per_attachment() {
        let fb = Framebuffer::new(
            FramebufferDescription::new(
                vec![FramebufferAttachment::new(&texture(PixelFormat::RGBA8UNorm, 8, 8))],
                Some(FramebufferAttachment::new(&texture(PixelFormat::D32Float, 8, 8))),
            ),
            "fb",
        );
        let pass = RenderPassDescription::new(
            &fb,
            LoadAction::Clear,
            StoreAction::Store,
            RgbaFloat::RED,
            0.5,
        );
        assert_eq!(pass.color_attachments[0].clear_color, RgbaFloat::RED);
        let depth = pass.depth_attachment.unwrap();
        assert_eq!(depth.clear_depth, 0.5);
        //D32Float has no stencil
        assert_eq!(depth.stencil_load, LoadAction::DontCare);
    }
}
