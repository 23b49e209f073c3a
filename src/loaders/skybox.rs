use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// Cube face file stems in upload order
pub const FACE_NAMES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

/// Six decoded RGBA8 cube faces sharing one square size
#[derive(Debug, Clone, PartialEq)]
pub struct CubeImages {
    pub size: u32,
    pub faces: [Vec<u8>; 6],
}

/// `<dir>/px.<ext>` ... `<dir>/nz.<ext>`
pub fn face_paths(dir: impl AsRef<Path>, extension: &str) -> [PathBuf; 6] {
    let dir = dir.as_ref();
    FACE_NAMES.map(|name| dir.join(format!("{name}.{extension}")))
}

/// Decodes six face images in px, nx, py, ny, pz, nz order
pub fn load_cube_images(paths: &[PathBuf; 6]) -> Result<CubeImages, LoadError> {
    let mut size = None;
    let mut faces: [Vec<u8>; 6] = Default::default();

    for (face, path) in faces.iter_mut().zip(paths) {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|source| LoadError::Image {
                path: path.clone(),
                source,
            })?
            .into_rgba8();

        let (width, height) = decoded.dimensions();
        if width != height {
            return Err(LoadError::Skybox(format!(
                "{} is {}x{}, faces must be square",
                path.display(),
                width,
                height
            )));
        }
        match size {
            None => size = Some(width),
            Some(expected) if expected != width => {
                return Err(LoadError::Skybox(format!(
                    "{} is {}px, expected {}px like the first face",
                    path.display(),
                    width,
                    expected
                )));
            }
            Some(_) => {}
        }

        log::debug!("Loaded skybox face {:?} ({}px)", path, width);
        *face = decoded.into_raw();
    }

    Ok(CubeImages {
        size: size.unwrap_or(0),
        faces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_faces(dir: &Path, sizes: [(u32, u32); 6]) -> [PathBuf; 6] {
        std::fs::create_dir_all(dir).unwrap();
        let paths = face_paths(dir, "png");
        for (path, (w, h)) in paths.iter().zip(sizes) {
            image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
                .save(path)
                .unwrap();
        }
        paths
    }

    #[test]
    fn face_paths_follow_cube_order() {
        let paths = face_paths("sky", "jpg");
        assert_eq!(paths[0], PathBuf::from("sky/px.jpg"));
        assert_eq!(paths[5], PathBuf::from("sky/nz.jpg"));
    }

    #[test]
    fn loads_six_square_faces() {
        let dir = std::env::temp_dir().join("hover_scene_sky_ok");
        let paths = write_faces(&dir, [(4, 4); 6]);
        let cube = load_cube_images(&paths).unwrap();
        assert_eq!(cube.size, 4);
        assert!(cube.faces.iter().all(|f| f.len() == 4 * 4 * 4));
        assert_eq!(&cube.faces[3][..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn mismatched_face_is_rejected() {
        let dir = std::env::temp_dir().join("hover_scene_sky_bad");
        let paths = write_faces(&dir, [(4, 4), (4, 4), (4, 4), (2, 2), (4, 4), (4, 4)]);
        let err = load_cube_images(&paths).unwrap_err();
        assert!(matches!(err, LoadError::Skybox(_)), "got {err:?}");
    }

    #[test]
    fn missing_face_is_io_error() {
        let paths = face_paths("no/such/sky", "png");
        assert!(matches!(load_cube_images(&paths), Err(LoadError::Io { .. })));
    }
}
