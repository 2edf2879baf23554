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

//! Shader compilation and the program wrapper.

use super::error::Error;
use super::gpu_backend::{check_gl_error, GpuContext, ShaderStage};

use std::fmt;
use std::mem;
use std::rc::Rc;

/// Compile a single shader stage.
///
/// On failure the shader object is deleted and the driver's info log is returned in the
/// error. The failure is only logged at `debug`; callers decide how loudly to report it.
pub fn compile_shader<C: GpuContext + ?Sized>(
    context: &C,
    stage: ShaderStage,
    source: &str,
) -> Result<C::Shader, Error> {
    let shader = context.create_shader(stage).ok_or_else(|| {
        tracing::debug!(%stage, "driver refused to create a shader object");
        Error::CreateShader(stage)
    })?;
    let _call_on_drop = CallOnDrop(|| context.delete_shader(shader));

    context.shader_source(shader, source);
    context.compile_shader(shader);

    let compiled = context.shader_compile_status(shader);
    context.release_shader_compiler();

    if !compiled {
        let log = context.shader_info_log(shader);
        tracing::debug!(?shader, %stage, "shader failed to compile:\n{}", log.trim_end());
        return Err(Error::Compile { stage, log });
    }

    tracing::trace!(?shader, %stage, "compiled shader");

    mem::forget(_call_on_drop);
    Ok(shader)
}

/// Compile a vertex and a fragment shader and link them into a program.
///
/// The shader objects are deleted whether or not linking succeeds; only the program
/// survives. Like [`compile_shader`], failures are only logged at `debug`.
pub fn link_program<C: GpuContext + ?Sized>(
    context: &C,
    vertex_shader: &str,
    fragment_shader: &str,
) -> Result<C::Program, Error> {
    let vertex_shader = compile_shader(context, ShaderStage::Vertex, vertex_shader)?;
    let _delete_vertex = CallOnDrop(|| context.delete_shader(vertex_shader));

    let fragment_shader = compile_shader(context, ShaderStage::Fragment, fragment_shader)?;
    let _delete_fragment = CallOnDrop(|| context.delete_shader(fragment_shader));

    let program = context.create_program().ok_or_else(|| {
        tracing::debug!("driver refused to create a program object");
        Error::CreateProgram
    })?;
    let _call_on_drop = CallOnDrop(|| context.delete_program(program));

    context.attach_shader(program, vertex_shader);
    check_gl_error(context, "glAttachShader(vertex)");
    context.attach_shader(program, fragment_shader);
    check_gl_error(context, "glAttachShader(fragment)");

    context.link_program(program);
    check_gl_error(context, "glLinkProgram");

    if !context.program_link_status(program) {
        let log = context.program_info_log(program);
        tracing::debug!(?program, "program failed to link:\n{}", log.trim_end());
        return Err(Error::Link { log });
    }

    tracing::debug!(?program, "linked shader program");

    mem::forget(_call_on_drop);
    Ok(program)
}

/// A linked shader program and the context it lives in.
///
/// The program object is deleted when this is dropped, so the context must still be
/// current at that point.
pub struct Program<C: GpuContext + ?Sized> {
    /// The driver this program was created with.
    context: Rc<C>,

    /// The program object, or `None` if building it failed.
    handle: Option<C::Program>,

    /// Whether `use_program` has already made this program current.
    used: bool,
}

impl<C: GpuContext + ?Sized> fmt::Debug for Program<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("handle", &self.handle)
            .field("used", &self.used)
            .finish_non_exhaustive()
    }
}

impl<C: GpuContext + ?Sized> Program<C> {
    /// Build a program from vertex and fragment shader source.
    ///
    /// Failures are logged and leave the program without a handle; every setter on such
    /// a program does nothing. Use [`Program::try_new`] to get the error instead.
    pub fn new(context: &Rc<C>, vertex_shader: &str, fragment_shader: &str) -> Self {
        let handle = match link_program(&**context, vertex_shader, fragment_shader) {
            Ok(program) => Some(program),
            Err(err) => {
                tracing::error!("{}", err);
                None
            }
        };

        Self {
            context: context.clone(),
            handle,
            used: false,
        }
    }

    /// Build a program from vertex and fragment shader source, returning the error
    /// on failure.
    pub fn try_new(
        context: &Rc<C>,
        vertex_shader: &str,
        fragment_shader: &str,
    ) -> Result<Self, Error> {
        let program = link_program(&**context, vertex_shader, fragment_shader)?;

        Ok(Self {
            context: context.clone(),
            handle: Some(program),
            used: false,
        })
    }

    /// The underlying program object, if linking succeeded.
    pub fn id(&self) -> Option<C::Program> {
        self.handle
    }

    /// Whether this program was linked successfully.
    pub fn is_linked(&self) -> bool {
        self.handle.is_some()
    }

    /// Get a reference to the driver.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Make this program current.
    ///
    /// The program is only bound on the first call. Binding another program elsewhere
    /// does not reset this; call [`Program::reset_usage`] for that.
    pub fn use_program(&mut self) {
        if !self.used {
            self.context.use_program(self.handle);
        }
        self.used = true;
    }

    /// Forget that this program was made current, so the next
    /// [`Program::use_program`] binds it again.
    pub fn reset_usage(&mut self) {
        self.used = false;
    }

    /// Whether the uniform exists in the linked program.
    pub fn has_uniform(&self, name: &str) -> bool {
        self.location(name).is_some()
    }

    /// Bind a 2D texture to a texture unit and point a sampler uniform at it.
    ///
    /// `unit` is zero-based. The texture is bound even if the sampler does not exist.
    /// Units that do not fit in a sampler uniform are logged and ignored.
    pub fn bind_texture(&self, name: &str, texture: C::Texture, unit: u32) {
        let sampler_value = match i32::try_from(unit) {
            Ok(value) => value,
            Err(_) => {
                tracing::error!("texture unit {} is out of range for sampler {}", unit, name);
                return;
            }
        };
        let location = self.location(name);

        self.context.active_texture(unit);
        check_gl_error(&*self.context, "glActiveTexture");
        self.context.bind_texture_2d(Some(texture));
        check_gl_error(&*self.context, "glBindTexture");

        match location {
            Some(location) => {
                self.context.uniform_1_i32(&location, sampler_value);
                check_gl_error(&*self.context, "glUniform1i");
            }
            None => tracing::trace!("sampler {} not found, texture left unassigned", name),
        }
    }

    /// Unbind whatever 2D texture is bound to a texture unit.
    pub fn unbind_texture(&self, unit: u32) {
        self.context.active_texture(unit);
        check_gl_error(&*self.context, "glActiveTexture");
        self.context.bind_texture_2d(None);
        check_gl_error(&*self.context, "glBindTexture");
    }

    /// Set an `int` or sampler uniform, doing nothing if the uniform does not exist.
    pub fn set_uniform_1i(&self, name: &str, value: i32) {
        if let Some(location) = self.location(name) {
            self.context.uniform_1_i32(&location, value);
        }
    }

    /// Set a `float` uniform, doing nothing if the uniform does not exist.
    pub fn set_uniform_1f(&self, name: &str, value: f32) {
        if let Some(location) = self.location(name) {
            self.context.uniform_1_f32(&location, value);
        }
    }

    /// Set a `vec2` uniform, doing nothing if the uniform does not exist.
    pub fn set_uniform_2f(&self, name: &str, x: f32, y: f32) {
        if let Some(location) = self.location(name) {
            self.context.uniform_2_f32(&location, x, y);
        }
    }

    /// Set a `vec3` uniform, doing nothing if the uniform does not exist.
    pub fn set_uniform_3f(&self, name: &str, x: f32, y: f32, z: f32) {
        if let Some(location) = self.location(name) {
            self.context.uniform_3_f32(&location, x, y, z);
        }
    }

    /// Upload a vector or matrix uniform, picking the type from the length of `values`.
    ///
    /// One to four values upload a `float` through `vec4`; sixteen values upload a
    /// column-major `mat4`. Any other length is ignored.
    pub fn set_uniform_v(&self, name: &str, values: &[f32]) {
        let location = match self.location(name) {
            Some(location) => location,
            None => return,
        };

        if let Ok(matrix) = <&[f32; 16]>::try_from(values) {
            self.context
                .uniform_matrix_4_f32_slice(&location, false, matrix);
        } else if (1..=4).contains(&values.len()) {
            self.context.uniform_f32_slice(&location, values);
        } else {
            tracing::warn!(
                "cannot upload {} values to uniform {}, expected 1, 2, 3, 4 or 16",
                values.len(),
                name
            );
        }
    }

    /// Upload a `mat4` uniform given as four columns.
    pub fn set_uniform_matrix4(&self, name: &str, columns: &[[f32; 4]; 4]) {
        let matrix: &[f32; 16] = bytemuck::cast_ref(columns);
        self.set_uniform_v(name, matrix);
    }

    fn location(&self, name: &str) -> Option<C::UniformLocation> {
        let program = self.handle?;
        self.context.uniform_location(program, name)
    }
}

impl<C: GpuContext + ?Sized> Drop for Program<C> {
    fn drop(&mut self) {
        if let Some(program) = self.handle.take() {
            self.context.delete_program(program);
        }
    }
}

struct CallOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}
