// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource creation.
//!
//! The factory turns description records into resource handles. It checks the
//! descriptions against the device's features; anything a backend needs to create
//! natively is created lazily by the executor that first uses the resource.

use crate::bindings::layout::{ResourceLayout, ResourceLayoutDescription};
use crate::bindings::resource_set::{ResourceSet, ResourceSetDescription, validate_resource_set};
use crate::bindings::resources::{
    BufferDescription, DeviceBuffer, Sampler, Texture, TextureDescription, TextureView,
    TextureViewDescription,
};
use crate::bindings::sampler::{SamplerDescription, SamplerFilter};
use crate::bindings::visible_to::TextureUsage;
use crate::command::{CommandList, CommandListDescription, Executor, UsageError, VALIDATE_USAGE};
use crate::device::{Device, Fence, Semaphore};
use crate::pass::{Framebuffer, FramebufferAttachment, FramebufferDescription};
use crate::pipeline::{
    ComputePipelineDescription, GraphicsPipelineDescription, Pipeline, PolygonFillMode,
};

/// Creates resources against a [`Device`].
#[derive(Debug, Clone, Copy)]
pub struct ResourceFactory<'a> {
    device: &'a Device,
}

impl<'a> ResourceFactory<'a> {
    pub(crate) fn new(device: &'a Device) -> Self {
        ResourceFactory { device }
    }

    pub fn create_buffer(&self, description: BufferDescription, name: &str) -> DeviceBuffer {
        DeviceBuffer::new(description, name)
    }

    pub fn create_texture(
        &self,
        description: TextureDescription,
        name: &str,
    ) -> Result<Texture, UsageError> {
        if VALIDATE_USAGE {
            if description.width == 0
                || description.height == 0
                || description.depth == 0
                || description.mip_levels == 0
                || description.array_layers == 0
            {
                return Err(UsageError::InvalidDescription(
                    "texture dimensions, mip levels and array layers must be non-zero",
                ));
            }
            if description.usage.contains(TextureUsage::GENERATE_MIPMAPS)
                && !self.device.features().mipmap_generation
            {
                return Err(UsageError::UnsupportedFeature("mipmap generation"));
            }
        }
        Ok(Texture::new(description, name))
    }

    pub fn create_texture_view(
        &self,
        description: TextureViewDescription,
        name: &str,
    ) -> Result<TextureView, UsageError> {
        if VALIDATE_USAGE {
            let target = &description.target;
            if description.mip_levels == 0
                || description.base_mip_level + description.mip_levels > target.mip_levels()
            {
                return Err(UsageError::MipLevelOutOfRange {
                    role: "viewed",
                    level: description.base_mip_level + description.mip_levels,
                    levels: target.mip_levels(),
                });
            }
            if description.array_layers == 0
                || description.base_array_layer + description.array_layers
                    > target.array_layers()
            {
                return Err(UsageError::ArrayLayersOutOfRange {
                    role: "viewed",
                    base: description.base_array_layer,
                    count: description.array_layers,
                    layers: target.array_layers(),
                });
            }
        }
        Ok(TextureView::new(description, name))
    }

    pub fn create_sampler(
        &self,
        description: SamplerDescription,
        name: &str,
    ) -> Result<Sampler, UsageError> {
        if VALIDATE_USAGE
            && description.filter == SamplerFilter::Anisotropic
            && !self.device.features().sampler_anisotropy
        {
            return Err(UsageError::UnsupportedFeature("sampler anisotropy"));
        }
        Ok(Sampler::new(description, name))
    }

    pub fn create_resource_layout(&self, description: ResourceLayoutDescription) -> ResourceLayout {
        ResourceLayout::new(description)
    }

    /// Creates a resource set, checking it conforms to its layout.
    pub fn create_resource_set(
        &self,
        description: ResourceSetDescription,
        name: &str,
    ) -> Result<ResourceSet, UsageError> {
        if VALIDATE_USAGE {
            validate_resource_set(&description, self.device.features(), self.device.limits())?;
        }
        Ok(ResourceSet::new(description, name))
    }

    pub fn create_graphics_pipeline(
        &self,
        description: GraphicsPipelineDescription,
        name: &str,
    ) -> Result<Pipeline, UsageError> {
        if VALIDATE_USAGE
            && description.rasterizer.fill_mode == PolygonFillMode::Wireframe
            && !self.device.features().fill_mode_wireframe
        {
            return Err(UsageError::UnsupportedFeature("wireframe fill mode"));
        }
        Ok(Pipeline::graphics(description, name))
    }

    pub fn create_compute_pipeline(
        &self,
        description: ComputePipelineDescription,
        name: &str,
    ) -> Result<Pipeline, UsageError> {
        if VALIDATE_USAGE && !self.device.features().compute_shader {
            return Err(UsageError::UnsupportedFeature("compute shaders"));
        }
        Ok(Pipeline::compute(description, name))
    }

    /// Creates a framebuffer; every attachment must have the same dimensions.
    pub fn create_framebuffer(
        &self,
        description: FramebufferDescription,
        name: &str,
    ) -> Result<Framebuffer, UsageError> {
        if VALIDATE_USAGE {
            for attachment in &description.color_targets {
                check_attachment(attachment, TextureUsage::RENDER_TARGET)?;
            }
            if let Some(depth) = &description.depth_target {
                check_attachment(depth, TextureUsage::DEPTH_STENCIL)?;
            }
            let mut sizes = description
                .color_targets
                .iter()
                .chain(description.depth_target.as_ref())
                .map(|a| a.target.mip_dimensions(a.mip_level));
            if let Some(first) = sizes.next() {
                if sizes.any(|s| (s.0, s.1) != (first.0, first.1)) {
                    return Err(UsageError::InvalidDescription(
                        "framebuffer attachments must have equal dimensions",
                    ));
                }
            }
        }
        Ok(Framebuffer::new(description, name))
    }

    pub fn create_fence(&self, signaled: bool) -> Fence {
        Fence::new(signaled)
    }

    pub fn create_semaphore(&self) -> Semaphore {
        Semaphore::new()
    }

    /// Creates a command list recording into `executor`.
    pub fn create_command_list<E: Executor>(
        &self,
        description: CommandListDescription,
        executor: E,
        name: &str,
    ) -> CommandList<E> {
        CommandList::new(
            description,
            executor,
            *self.device.features(),
            *self.device.limits(),
            name,
        )
    }
}

fn check_attachment(
    attachment: &FramebufferAttachment,
    required: TextureUsage,
) -> Result<(), UsageError> {
    let target = &attachment.target;
    if !target.usage().contains(required) {
        return Err(UsageError::MissingTextureUsage {
            texture: target.id(),
            required,
        });
    }
    if attachment.mip_level >= target.mip_levels() {
        return Err(UsageError::MipLevelOutOfRange {
            role: "attached",
            level: attachment.mip_level,
            levels: target.mip_levels(),
        });
    }
    if attachment.array_layer >= target.array_layers() {
        return Err(UsageError::ArrayLayersOutOfRange {
            role: "attached",
            base: attachment.array_layer,
            count: 1,
            layers: target.array_layers(),
        });
    }
    Ok(())
}
