// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `glprogram`.
//
// `glprogram` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `glprogram` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `glprogram`. If not, see <https://www.gnu.org/licenses/>.

//! A [`glprogram`] backend that uses the [`glow`] crate.
//!
//! ```no_run
//! # fn load(gl: glow::Context) -> Result<(), Box<dyn std::error::Error>> {
//! use glprogram_glow::{GlContext, GlProgram};
//! use std::rc::Rc;
//!
//! // SAFETY: `gl` is current on this thread.
//! let context = Rc::new(unsafe { GlContext::new(gl)? });
//! let vertex = context.prefix_header("void main() { gl_Position = vec4(0.0); }");
//! let fragment = context.prefix_header("out vec4 color; void main() { color = vec4(1.0); }");
//!
//! let mut program = GlProgram::try_new(&context, &vertex, &fragment)?;
//! program.use_program();
//! program.set_uniform_1f("uTime", 0.5);
//! # Ok(())
//! # }
//! ```
//!
//! [`glow`]: https://crates.io/crates/glow

use glow::HasContext;
use glprogram::{DriverError, GpuContext, ShaderStage};

use std::fmt;

pub use glprogram;

/// A [`glprogram::Program`] driven by a [`glow`] context.
pub type GlProgram<H> = glprogram::Program<GlContext<H>>;

/// The GLSL dialect accepted by the current context.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GlslVersion {
    /// GLSL 3.30, desktop OpenGL 3.3 or higher.
    Glsl330,

    /// GLSL ES 3.00, OpenGL ES 3.0 or higher.
    Es300,

    /// GLSL ES 1.00, OpenGL ES 2.0.
    Es100,
}

impl GlslVersion {
    fn from_version(major: u32, minor: u32, is_embedded: bool) -> Option<Self> {
        if is_embedded {
            match major {
                0 | 1 => None,
                2 => Some(GlslVersion::Es100),
                _ => Some(GlslVersion::Es300),
            }
        } else if major > 3 || (major == 3 && minor >= 3) {
            Some(GlslVersion::Glsl330)
        } else {
            None
        }
    }

    /// The `#version` line for this dialect.
    pub fn header(self) -> &'static str {
        match self {
            GlslVersion::Glsl330 => "#version 330 core",
            GlslVersion::Es300 => "#version 300 es",
            GlslVersion::Es100 => "#version 100",
        }
    }
}

/// A wrapper around a [`glow`] context that implements [`GpuContext`].
pub struct GlContext<H: HasContext + ?Sized> {
    /// The shading language version of the context.
    glsl: GlslVersion,

    /// The underlying context.
    context: H,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlContext<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlContext")
            .field("glsl", &self.glsl)
            .finish_non_exhaustive()
    }
}

impl<H: HasContext + ?Sized> GlContext<H> {
    /// Create a new [`GlContext`] from a [`glow`] context.
    ///
    /// # Safety
    ///
    /// The context must be current while calling new, and must stay current for as long
    /// as this type or any program built from it is used or dropped.
    pub unsafe fn new(context: H) -> Result<Self, GlError>
    where
        H: Sized,
    {
        let version = context.version();

        let glsl = GlslVersion::from_version(version.major, version.minor, version.is_embedded)
            .ok_or_else(|| {
                GlError(format!(
                    "OpenGL 3.3 or OpenGL ES 2.0 or higher is required, found {}.{}{}",
                    version.major,
                    version.minor,
                    if version.is_embedded { " ES" } else { "" }
                ))
            })?;

        tracing::debug!(?glsl, "created GL context wrapper");

        Ok(Self { glsl, context })
    }

    /// The shading language version of the context.
    pub fn glsl_version(&self) -> GlslVersion {
        self.glsl
    }

    /// The `#version` line matching the context.
    pub fn glsl_header(&self) -> &'static str {
        self.glsl.header()
    }

    /// Prepend the `#version` line to shader source.
    pub fn prefix_header(&self, source: &str) -> String {
        format!("{}\n{}", self.glsl_header(), source)
    }

    /// Log the vendor, renderer and version strings of the driver.
    pub fn log_info(&self) {
        let strings = [
            ("Vendor", glow::VENDOR),
            ("Renderer", glow::RENDERER),
            ("Version", glow::VERSION),
            ("GLSL version", glow::SHADING_LANGUAGE_VERSION),
        ];

        for (name, parameter) in strings {
            let value = unsafe { self.context.get_parameter_string(parameter) };
            tracing::info!("GL {} = {}", name, value);
        }
    }

    /// Get a reference to the underlying [`glow`] context.
    pub fn get_ref(&self) -> &H {
        &self.context
    }

    /// Consume this structure and return the underlying context.
    pub fn into_inner(self) -> H
    where
        H: Sized,
    {
        self.context
    }
}

impl<H: HasContext + ?Sized> GpuContext for GlContext<H> {
    type Shader = H::Shader;
    type Program = H::Program;
    type Texture = H::Texture;
    type UniformLocation = H::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };

        unsafe { self.context.create_shader(shader_type) }
            .map_err(|e| tracing::error!("glCreateShader failed: {}", e))
            .ok()
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.context.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.context.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.context.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.context.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.context.delete_shader(shader) }
    }

    fn create_program(&self) -> Option<Self::Program> {
        unsafe { self.context.create_program() }
            .map_err(|e| tracing::error!("glCreateProgram failed: {}", e))
            .ok()
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.context.attach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.context.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.context.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.context.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.context.delete_program(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.context.use_program(program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.context.get_uniform_location(program, name) }
    }

    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32) {
        unsafe { self.context.uniform_1_i32(Some(location), x) }
    }

    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32) {
        unsafe { self.context.uniform_1_f32(Some(location), x) }
    }

    fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32) {
        unsafe { self.context.uniform_2_f32(Some(location), x, y) }
    }

    fn uniform_3_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32) {
        unsafe { self.context.uniform_3_f32(Some(location), x, y, z) }
    }

    fn uniform_f32_slice(&self, location: &Self::UniformLocation, values: &[f32]) {
        unsafe {
            match values.len() {
                1 => self.context.uniform_1_f32_slice(Some(location), values),
                2 => self.context.uniform_2_f32_slice(Some(location), values),
                3 => self.context.uniform_3_f32_slice(Some(location), values),
                4 => self.context.uniform_4_f32_slice(Some(location), values),
                n => tracing::error!("no vector uniform has {} components", n),
            }
        }
    }

    fn uniform_matrix_4_f32_slice(
        &self,
        location: &Self::UniformLocation,
        transpose: bool,
        values: &[f32; 16],
    ) {
        unsafe {
            self.context
                .uniform_matrix_4_f32_slice(Some(location), transpose, values)
        }
    }

    fn active_texture(&self, unit: u32) {
        match texture_unit(unit) {
            Some(unit) => unsafe { self.context.active_texture(unit) },
            None => tracing::error!("texture unit {} is out of range", unit),
        }
    }

    fn bind_texture_2d(&self, texture: Option<Self::Texture>) {
        unsafe { self.context.bind_texture(glow::TEXTURE_2D, texture) }
    }

    fn get_error(&self) -> Option<DriverError> {
        driver_error(unsafe { self.context.get_error() })
    }
}

/// The `GL_TEXTUREn` enum for a zero-based unit.
fn texture_unit(unit: u32) -> Option<u32> {
    glow::TEXTURE0.checked_add(unit)
}

fn driver_error(code: u32) -> Option<DriverError> {
    Some(match code {
        glow::NO_ERROR => return None,
        glow::INVALID_ENUM => DriverError::InvalidEnum,
        glow::INVALID_VALUE => DriverError::InvalidValue,
        glow::INVALID_OPERATION => DriverError::InvalidOperation,
        glow::STACK_OVERFLOW => DriverError::StackOverflow,
        glow::STACK_UNDERFLOW => DriverError::StackUnderflow,
        glow::OUT_OF_MEMORY => DriverError::OutOfMemory,
        glow::INVALID_FRAMEBUFFER_OPERATION => DriverError::InvalidFramebufferOperation,
        glow::CONTEXT_LOST => DriverError::ContextLost,
        code => DriverError::Unknown(code),
    })
}

/// An error raised while wrapping a [`glow`] context.
#[derive(Debug)]
pub struct GlError(String);

impl From<String> for GlError {
    fn from(s: String) -> Self {
        GlError(s)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl error: {}", self.0)
    }
}

impl std::error::Error for GlError {}
