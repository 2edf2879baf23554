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

//! Compiles, links and drives OpenGL shader programs.
//!
//! The centerpiece of this crate is the [`Program`] structure, which compiles a vertex and
//! a fragment shader, links them, and then exposes setters for uniforms and texture
//! units. It talks to the driver through the [`GpuContext`] trait; the `glprogram-glow`
//! crate implements that trait on top of [`glow`].
//!
//! Building a program never panics on bad shader source. Failures are logged through
//! [`tracing`] and leave the [`Program`] without a handle, at which point every setter is
//! a no-op. [`Program::try_new`] returns the [`Error`] instead.
//!
//! [`glow`]: https://crates.io/crates/glow
//! [`tracing`]: https://crates.io/crates/tracing

mod error;
mod gpu_backend;
mod program;

#[cfg(test)]
mod mock;

pub use error::Error;
pub use gpu_backend::{check_gl_error, DriverError, GpuContext, ShaderStage};
pub use program::{compile_shader, link_program, Program};
