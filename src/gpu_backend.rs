// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `glprogram`.
//
// `glprogram` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `glprogram` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `glprogram`. If not, see <https://www.gnu.org/licenses/>.

//! Defines the driver backend for glprogram.

use std::fmt;
use std::rc::Rc;

/// The driver entry points needed to build and drive a shader program.
///
/// This corresponds closely to the shader, program, uniform and texture-unit calls of
/// OpenGL and OpenGL ES. Every method assumes that the underlying context is current on
/// the calling thread.
pub trait GpuContext {
    /// A compiled shader object.
    type Shader: Copy + fmt::Debug;

    /// A linked program object.
    type Program: Copy + fmt::Debug;

    /// A texture object.
    type Texture: Copy + fmt::Debug;

    /// The location of a uniform inside of a linked program.
    type UniformLocation: Clone + fmt::Debug;

    /// Create a new, empty shader object for the given stage.
    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;

    /// Replace the source code of a shader.
    fn shader_source(&self, shader: Self::Shader, source: &str);

    /// Compile a shader.
    fn compile_shader(&self, shader: Self::Shader);

    /// Whether the last compilation of this shader succeeded.
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;

    /// Get the info log for a shader.
    fn shader_info_log(&self, shader: Self::Shader) -> String;

    /// Delete a shader object.
    fn delete_shader(&self, shader: Self::Shader);

    /// Hint that the shader compiler's resources may be freed.
    ///
    /// Backends that do not expose this hint can leave the default.
    fn release_shader_compiler(&self) {}

    /// Create a new, empty program object.
    fn create_program(&self) -> Option<Self::Program>;

    /// Attach a shader to a program.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Link a program.
    fn link_program(&self, program: Self::Program);

    /// Whether the last link of this program succeeded.
    fn program_link_status(&self, program: Self::Program) -> bool;

    /// Get the info log for a program.
    fn program_info_log(&self, program: Self::Program) -> String;

    /// Delete a program object.
    fn delete_program(&self, program: Self::Program);

    /// Make a program current, or unbind the current one.
    fn use_program(&self, program: Option<Self::Program>);

    /// Look up a uniform by name.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Set an `int` or sampler uniform.
    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32);

    /// Set a `float` uniform.
    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32);

    /// Set a `vec2` uniform.
    fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32);

    /// Set a `vec3` uniform.
    fn uniform_3_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);

    /// Upload a single vector uniform of one to four components.
    ///
    /// The length of `values` picks the vector width.
    fn uniform_f32_slice(&self, location: &Self::UniformLocation, values: &[f32]);

    /// Upload a single `mat4` uniform in column-major order.
    fn uniform_matrix_4_f32_slice(
        &self,
        location: &Self::UniformLocation,
        transpose: bool,
        values: &[f32; 16],
    );

    /// Select the active texture unit, starting from zero.
    fn active_texture(&self, unit: u32);

    /// Bind a 2D texture to the active texture unit.
    fn bind_texture_2d(&self, texture: Option<Self::Texture>);

    /// Pop the oldest error off of the driver's error queue.
    fn get_error(&self) -> Option<DriverError>;
}

/// The stage that a shader object belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex shader.
    Vertex,

    /// The fragment shader.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// An error code reported by the driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DriverError {
    /// `GL_INVALID_ENUM`
    InvalidEnum,

    /// `GL_INVALID_VALUE`
    InvalidValue,

    /// `GL_INVALID_OPERATION`
    InvalidOperation,

    /// `GL_STACK_OVERFLOW`
    StackOverflow,

    /// `GL_STACK_UNDERFLOW`
    StackUnderflow,

    /// `GL_OUT_OF_MEMORY`
    OutOfMemory,

    /// `GL_INVALID_FRAMEBUFFER_OPERATION`
    InvalidFramebufferOperation,

    /// `GL_CONTEXT_LOST`
    ContextLost,

    /// A code this crate does not know about.
    Unknown(u32),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::InvalidEnum => f.write_str("GL_INVALID_ENUM"),
            DriverError::InvalidValue => f.write_str("GL_INVALID_VALUE"),
            DriverError::InvalidOperation => f.write_str("GL_INVALID_OPERATION"),
            DriverError::StackOverflow => f.write_str("GL_STACK_OVERFLOW"),
            DriverError::StackUnderflow => f.write_str("GL_STACK_UNDERFLOW"),
            DriverError::OutOfMemory => f.write_str("GL_OUT_OF_MEMORY"),
            DriverError::InvalidFramebufferOperation => {
                f.write_str("GL_INVALID_FRAMEBUFFER_OPERATION")
            }
            DriverError::ContextLost => f.write_str("GL_CONTEXT_LOST"),
            DriverError::Unknown(code) => write!(f, "unknown GL error {code:#06x}"),
        }
    }
}

/// Most errors drained by a single [`check_gl_error`] call.
///
/// A lost context may keep reporting an error on every query.
pub(crate) const MAX_DRAINED_ERRORS: usize = 16;

/// Drain the driver's error queue, logging every error against `op`.
///
/// Returns the number of errors that were drained.
pub fn check_gl_error<C: GpuContext + ?Sized>(context: &C, op: &str) -> usize {
    let mut count = 0;

    while count < MAX_DRAINED_ERRORS {
        match context.get_error() {
            Some(err) => {
                tracing::error!("GL error after {}: {}", op, err);
                count += 1;
            }
            None => break,
        }
    }

    count
}

macro_rules! forward_gpu_context {
    ($($ptr:ty),* $(,)?) => {
        $(
            impl<C: GpuContext + ?Sized> GpuContext for $ptr {
                type Shader = C::Shader;
                type Program = C::Program;
                type Texture = C::Texture;
                type UniformLocation = C::UniformLocation;

                fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader> {
                    (**self).create_shader(stage)
                }

                fn shader_source(&self, shader: Self::Shader, source: &str) {
                    (**self).shader_source(shader, source)
                }

                fn compile_shader(&self, shader: Self::Shader) {
                    (**self).compile_shader(shader)
                }

                fn shader_compile_status(&self, shader: Self::Shader) -> bool {
                    (**self).shader_compile_status(shader)
                }

                fn shader_info_log(&self, shader: Self::Shader) -> String {
                    (**self).shader_info_log(shader)
                }

                fn delete_shader(&self, shader: Self::Shader) {
                    (**self).delete_shader(shader)
                }

                fn release_shader_compiler(&self) {
                    (**self).release_shader_compiler()
                }

                fn create_program(&self) -> Option<Self::Program> {
                    (**self).create_program()
                }

                fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
                    (**self).attach_shader(program, shader)
                }

                fn link_program(&self, program: Self::Program) {
                    (**self).link_program(program)
                }

                fn program_link_status(&self, program: Self::Program) -> bool {
                    (**self).program_link_status(program)
                }

                fn program_info_log(&self, program: Self::Program) -> String {
                    (**self).program_info_log(program)
                }

                fn delete_program(&self, program: Self::Program) {
                    (**self).delete_program(program)
                }

                fn use_program(&self, program: Option<Self::Program>) {
                    (**self).use_program(program)
                }

                fn uniform_location(
                    &self,
                    program: Self::Program,
                    name: &str,
                ) -> Option<Self::UniformLocation> {
                    (**self).uniform_location(program, name)
                }

                fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32) {
                    (**self).uniform_1_i32(location, x)
                }

                fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32) {
                    (**self).uniform_1_f32(location, x)
                }

                fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32) {
                    (**self).uniform_2_f32(location, x, y)
                }

                fn uniform_3_f32(
                    &self,
                    location: &Self::UniformLocation,
                    x: f32,
                    y: f32,
                    z: f32,
                ) {
                    (**self).uniform_3_f32(location, x, y, z)
                }

                fn uniform_f32_slice(&self, location: &Self::UniformLocation, values: &[f32]) {
                    (**self).uniform_f32_slice(location, values)
                }

                fn uniform_matrix_4_f32_slice(
                    &self,
                    location: &Self::UniformLocation,
                    transpose: bool,
                    values: &[f32; 16],
                ) {
                    (**self).uniform_matrix_4_f32_slice(location, transpose, values)
                }

                fn active_texture(&self, unit: u32) {
                    (**self).active_texture(unit)
                }

                fn bind_texture_2d(&self, texture: Option<Self::Texture>) {
                    (**self).bind_texture_2d(texture)
                }

                fn get_error(&self) -> Option<DriverError> {
                    (**self).get_error()
                }
            }
        )*
    };
}

forward_gpu_context! {
    &C,
    Rc<C>,
}
