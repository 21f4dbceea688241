//! Error types for wishtree.
//!
//! Nothing here is fatal to a running scene: texture errors skip one photo,
//! memory errors become a fallback message. Only the viewer's start-up
//! errors end the process.

use std::fmt;

/// Errors that can occur while loading a photo's pixels.
#[derive(Debug)]
pub enum TextureError {
    /// The bytes are not a decodable image.
    ImageLoad(image::ImageError),
    /// Failed to read file from disk.
    Io(std::io::Error),
    /// Failed to download a remote image.
    Fetch(reqwest::Error),
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::ImageLoad(e) => write!(f, "Failed to decode image: {}", e),
            TextureError::Io(e) => write!(f, "Failed to read image file: {}", e),
            TextureError::Fetch(e) => write!(f, "Failed to download image: {}", e),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::ImageLoad(e) => Some(e),
            TextureError::Io(e) => Some(e),
            TextureError::Fetch(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::ImageLoad(e)
    }
}

impl From<std::io::Error> for TextureError {
    fn from(e: std::io::Error) -> Self {
        TextureError::Io(e)
    }
}

impl From<reqwest::Error> for TextureError {
    fn from(e: reqwest::Error) -> Self {
        TextureError::Fetch(e)
    }
}

/// Errors from the generative text service.
#[derive(Debug)]
pub enum MemoryError {
    /// The API key environment variable is unset or empty.
    MissingApiKey(String),
    /// Transport failure, including timeouts.
    Http(reqwest::Error),
    /// The service answered with a non-success status.
    Status(u16),
    /// The reply did not have the expected shape.
    Malformed(String),
    /// The reply contained no text.
    EmptyResponse,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::MissingApiKey(var) => write!(f, "No API key found in ${}", var),
            MemoryError::Http(e) => write!(f, "Memory service request failed: {}", e),
            MemoryError::Status(code) => write!(f, "Memory service returned HTTP {}", code),
            MemoryError::Malformed(msg) => write!(f, "Malformed memory service reply: {}", msg),
            MemoryError::EmptyResponse => write!(f, "Memory service returned no text"),
        }
    }
}

impl std::error::Error for MemoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MemoryError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MemoryError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => MemoryError::Status(status.as_u16()),
            None => MemoryError::Http(e),
        }
    }
}

/// Errors that can occur when loading or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Json(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors that can occur during GPU initialization.
#[cfg(feature = "viewer")]
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

#[cfg(feature = "viewer")]
impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

#[cfg(feature = "viewer")]
impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

#[cfg(feature = "viewer")]
impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

#[cfg(feature = "viewer")]
impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the viewer.
#[cfg(feature = "viewer")]
#[derive(Debug)]
pub enum ViewerError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Configuration could not be loaded.
    Config(ConfigError),
    /// The memory service client could not be built.
    Memory(MemoryError),
}

#[cfg(feature = "viewer")]
impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            ViewerError::Window(e) => write!(f, "Failed to create window: {}", e),
            ViewerError::Gpu(e) => write!(f, "GPU error: {}", e),
            ViewerError::Config(e) => write!(f, "Config error: {}", e),
            ViewerError::Memory(e) => write!(f, "Memory service error: {}", e),
        }
    }
}

#[cfg(feature = "viewer")]
impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
            ViewerError::Gpu(e) => Some(e),
            ViewerError::Config(e) => Some(e),
            ViewerError::Memory(e) => Some(e),
        }
    }
}

#[cfg(feature = "viewer")]
impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

#[cfg(feature = "viewer")]
impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}

#[cfg(feature = "viewer")]
impl From<GpuError> for ViewerError {
    fn from(e: GpuError) -> Self {
        ViewerError::Gpu(e)
    }
}

#[cfg(feature = "viewer")]
impl From<ConfigError> for ViewerError {
    fn from(e: ConfigError) -> Self {
        ViewerError::Config(e)
    }
}

#[cfg(feature = "viewer")]
impl From<MemoryError> for ViewerError {
    fn from(e: MemoryError) -> Self {
        ViewerError::Memory(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_error_display() {
        let e = MemoryError::MissingApiKey("GEMINI_API_KEY".into());
        assert_eq!(e.to_string(), "No API key found in $GEMINI_API_KEY");
        assert_eq!(MemoryError::Status(429).to_string(), "Memory service returned HTTP 429");
    }

    #[test]
    fn test_texture_error_source() {
        use std::error::Error;
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e = TextureError::from(io);
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("Failed to read image file"));
    }
}
