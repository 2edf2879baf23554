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

//! A recording driver used by the unit tests.

use crate::gpu_backend::{DriverError, GpuContext, ShaderStage};

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

/// A driver call that changes state.
///
/// Queries (statuses, info logs, uniform lookups, errors) are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateShader(ShaderStage, u32),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    ReleaseShaderCompiler,
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    Uniform1i(String, i32),
    Uniform1f(String, f32),
    Uniform2f(String, f32, f32),
    Uniform3f(String, f32, f32, f32),
    UniformSlice(String, Vec<f32>),
    UniformMatrix4(String, bool, Vec<f32>),
    ActiveTexture(u32),
    BindTexture2d(Option<u32>),
}

#[derive(Default)]
pub(crate) struct MockContext {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u32>,
    stages: RefCell<HashMap<u32, ShaderStage>>,
    uniforms: RefCell<HashSet<String>>,
    errors: RefCell<VecDeque<DriverError>>,
    context_lost: Cell<bool>,

    refuse_shader: Cell<Option<ShaderStage>>,
    broken_stage: Cell<Option<ShaderStage>>,
    refuse_program: Cell<bool>,
    broken_link: Cell<bool>,
}

impl MockContext {
    pub(crate) fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            ..Default::default()
        }
    }

    /// Declare uniforms that the next linked program will expose.
    pub(crate) fn with_uniforms(self, names: &[&str]) -> Self {
        self.uniforms
            .borrow_mut()
            .extend(names.iter().map(|s| s.to_string()));
        self
    }

    pub(crate) fn refuse_shader(&self, stage: ShaderStage) {
        self.refuse_shader.set(Some(stage));
    }

    pub(crate) fn break_stage(&self, stage: ShaderStage) {
        self.broken_stage.set(Some(stage));
    }

    pub(crate) fn refuse_program(&self) {
        self.refuse_program.set(true);
    }

    pub(crate) fn break_link(&self) {
        self.broken_link.set(true);
    }

    pub(crate) fn push_errors(&self, errors: &[DriverError]) {
        self.errors.borrow_mut().extend(errors.iter().copied());
    }

    pub(crate) fn set_context_lost(&self, lost: bool) {
        self.context_lost.set(lost);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Ids of every shader that was created but never deleted.
    pub(crate) fn live_shaders(&self) -> Vec<u32> {
        let calls = self.calls.borrow();
        calls
            .iter()
            .filter_map(|call| match call {
                Call::CreateShader(_, id) => Some(*id),
                _ => None,
            })
            .filter(|id| !calls.contains(&Call::DeleteShader(*id)))
            .collect()
    }

    /// Ids of every program that was created but never deleted.
    pub(crate) fn live_programs(&self) -> Vec<u32> {
        let calls = self.calls.borrow();
        calls
            .iter()
            .filter_map(|call| match call {
                Call::CreateProgram(id) => Some(*id),
                _ => None,
            })
            .filter(|id| !calls.contains(&Call::DeleteProgram(*id)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl GpuContext for MockContext {
    type Shader = u32;
    type Program = u32;
    type Texture = u32;
    type UniformLocation = String;

    fn create_shader(&self, stage: ShaderStage) -> Option<u32> {
        if self.refuse_shader.get() == Some(stage) {
            return None;
        }

        let id = self.next_id();
        self.stages.borrow_mut().insert(id, stage);
        self.record(Call::CreateShader(stage, id));
        Some(id)
    }

    fn shader_source(&self, shader: u32, _source: &str) {
        self.record(Call::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: u32) {
        self.record(Call::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let stage = self.stages.borrow().get(&shader).copied();
        stage.is_some() && stage != self.broken_stage.get()
    }

    fn shader_info_log(&self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "0:1(1): error: syntax error, unexpected NEW_IDENTIFIER\n".into()
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.record(Call::DeleteShader(shader));
    }

    fn release_shader_compiler(&self) {
        self.record(Call::ReleaseShaderCompiler);
    }

    fn create_program(&self) -> Option<u32> {
        if self.refuse_program.get() {
            return None;
        }

        let id = self.next_id();
        self.record(Call::CreateProgram(id));
        Some(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(Call::AttachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        self.record(Call::LinkProgram(program));
    }

    fn program_link_status(&self, _program: u32) -> bool {
        !self.broken_link.get()
    }

    fn program_info_log(&self, program: u32) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            "error: vertex shader lacks `main'\n".into()
        }
    }

    fn delete_program(&self, program: u32) {
        self.record(Call::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_location(&self, _program: u32, name: &str) -> Option<String> {
        self.uniforms.borrow().get(name).cloned()
    }

    fn uniform_1_i32(&self, location: &String, x: i32) {
        self.record(Call::Uniform1i(location.clone(), x));
    }

    fn uniform_1_f32(&self, location: &String, x: f32) {
        self.record(Call::Uniform1f(location.clone(), x));
    }

    fn uniform_2_f32(&self, location: &String, x: f32, y: f32) {
        self.record(Call::Uniform2f(location.clone(), x, y));
    }

    fn uniform_3_f32(&self, location: &String, x: f32, y: f32, z: f32) {
        self.record(Call::Uniform3f(location.clone(), x, y, z));
    }

    fn uniform_f32_slice(&self, location: &String, values: &[f32]) {
        self.record(Call::UniformSlice(location.clone(), values.to_vec()));
    }

    fn uniform_matrix_4_f32_slice(&self, location: &String, transpose: bool, values: &[f32; 16]) {
        self.record(Call::UniformMatrix4(
            location.clone(),
            transpose,
            values.to_vec(),
        ));
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture_2d(&self, texture: Option<u32>) {
        self.record(Call::BindTexture2d(texture));
    }

    fn get_error(&self) -> Option<DriverError> {
        if self.context_lost.get() {
            return Some(DriverError::ContextLost);
        }

        self.errors.borrow_mut().pop_front()
    }
}
