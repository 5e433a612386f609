// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Declaration and graph-validation log messages.

use std::fmt;

pub struct DeclarationOverwritten<'a> {
    pub name: &'a str,
}

impl fmt::Display for DeclarationOverwritten<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Declaration '{}' overwritten by a later declaration",
            self.name
        )
    }
}

pub struct BuildOrderResolved {
    pub count: usize,
}

impl fmt::Display for BuildOrderResolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Build order resolved: {} node(s)", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_render() {
        assert_eq!(
            DeclarationOverwritten { name: "writer" }.to_string(),
            "Declaration 'writer' overwritten by a later declaration"
        );
        assert_eq!(
            BuildOrderResolved { count: 4 }.to_string(),
            "Build order resolved: 4 node(s)"
        );
    }
}
