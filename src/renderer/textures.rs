use crate::loaders::CubeImages;
use crate::scene::TextureData;

/// Base-colour and environment textures hold sRGB-encoded texels
const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub fn create_sampler(device: &wgpu::Device, label: &str, address_mode: wgpu::AddressMode) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Uploads an RGBA8 image. Returns `None` when the pixel buffer does not
/// match the declared size.
pub fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &TextureData,
) -> Option<wgpu::TextureView> {
    let expected_size = (image.width * image.height * 4) as usize;
    if image.width == 0 || image.height == 0 || image.data.len() != expected_size {
        log::warn!(
            "Invalid pixel buffer for {}: expected {} bytes, got {}",
            label,
            expected_size,
            image.data.len()
        );
        return None;
    }

    Some(create_rgba(device, queue, label, image.width, image.height, &image.data))
}

fn create_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    data: &[u8],
) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        texture.as_image_copy(),
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// 1x1 white texture for untextured materials
pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
    create_rgba(device, queue, "White Texture", 1, 1, &[255; 4])
}

/// Six-layer cube texture, faces in px, nx, py, ny, pz, nz order
pub fn upload_cube(device: &wgpu::Device, queue: &wgpu::Queue, images: &CubeImages) -> wgpu::TextureView {
    let size = images.size.max(1);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Environment Cube"),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 6,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (layer, face) in images.faces.iter().enumerate() {
        if face.len() != (size * size * 4) as usize {
            log::warn!("Skipping cube face {} with {} bytes", layer, face.len());
            continue;
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            face,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size),
                rows_per_image: Some(size),
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );
    }

    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Environment Cube View"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    })
}

/// Black 1x1 cube bound while no environment is loaded
pub fn placeholder_cube(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
    let images = CubeImages {
        size: 1,
        faces: std::array::from_fn(|_| vec![0, 0, 0, 255]),
    };
    upload_cube(device, queue, &images)
}
