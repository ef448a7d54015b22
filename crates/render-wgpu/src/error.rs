/// Errors from bringing up or rebuilding the GPU backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("shader compilation failed for {label}: {message}")]
    ShaderCompilation { label: &'static str, message: String },
}
