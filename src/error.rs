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

//! The error type for building programs.

use super::gpu_backend::ShaderStage;

use std::fmt;

/// An error that occurred while building a shader program.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The driver refused to create a shader object.
    CreateShader(ShaderStage),

    /// A shader failed to compile.
    Compile {
        /// The stage that failed.
        stage: ShaderStage,

        /// The driver's info log, possibly empty.
        log: String,
    },

    /// The driver refused to create a program object.
    CreateProgram,

    /// The program failed to link.
    Link {
        /// The driver's info log, possibly empty.
        log: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CreateShader(stage) => write!(f, "failed to create {stage} shader object"),
            Error::Compile { stage, log } => {
                write!(f, "failed to compile {stage} shader")?;
                write_log(f, log)
            }
            Error::CreateProgram => f.write_str("failed to create program object"),
            Error::Link { log } => {
                f.write_str("failed to link program")?;
                write_log(f, log)
            }
        }
    }
}

impl std::error::Error for Error {}

fn write_log(f: &mut fmt::Formatter<'_>, log: &str) -> fmt::Result {
    let log = log.trim_end();
    if log.is_empty() {
        Ok(())
    } else {
        write!(f, ":\n{log}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_info_log() {
        let err = Error::Compile {
            stage: ShaderStage::Vertex,
            log: "0:1(1): error: syntax error\n".into(),
        };

        assert_eq!(
            err.to_string(),
            "failed to compile vertex shader:\n0:1(1): error: syntax error"
        );
    }

    #[test]
    fn display_skips_empty_log() {
        let err = Error::Link { log: String::new() };
        assert_eq!(err.to_string(), "failed to link program");
    }
}
