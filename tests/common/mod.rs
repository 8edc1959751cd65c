//! Synthetic container encoder for building test fixtures.
#![allow(dead_code)]

use std::path::Path;

pub struct SectionSpec {
    pub name:  [u8; 12],
    pub ty:    u8,
    pub body:  Vec<u8>,
    /// Overrides the size written to the table (defaults to `body.len()`).
    pub size:  Option<u32>,
}

impl SectionSpec {
    pub fn new(name: &str, ty: u8, body: &[u8]) -> Self {
        let mut raw = [0u8; 12];
        let n = name.len().min(12);
        raw[..n].copy_from_slice(&name.as_bytes()[..n]);
        Self { name: raw, ty, body: body.to_vec(), size: None }
    }

    pub fn declared_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}

pub struct ContainerBuilder {
    pub version:  i32,
    /// Written as-is; lets tests produce out-of-range counts.
    pub count:    Option<u8>,
    pub sections: Vec<SectionSpec>,
    pub magic:    [u8; 2],
    pub prefix:   Vec<u8>,
}

impl ContainerBuilder {
    pub fn new(version: i32) -> Self {
        Self { version, count: None, sections: Vec::new(), magic: *b"Vu", prefix: Vec::new() }
    }

    pub fn section(mut self, s: SectionSpec) -> Self {
        self.sections.push(s);
        self
    }

    pub fn count(mut self, count: u8) -> Self {
        self.count = Some(count);
        self
    }

    pub fn magic(mut self, magic: [u8; 2]) -> Self {
        self.magic = magic;
        self
    }

    /// Bytes: prefix, section bodies in order, then the trailer header.
    pub fn build(&self) -> Vec<u8> {
        let mut out = self.prefix.clone();
        let mut table = Vec::new();
        for s in &self.sections {
            let offset = out.len() as u32;
            out.extend_from_slice(&s.body);
            table.extend_from_slice(&s.name);
            table.push(s.ty);
            table.extend_from_slice(&offset.to_le_bytes());
            table.extend_from_slice(&s.size.unwrap_or(s.body.len() as u32).to_le_bytes());
        }
        let header_size = (4 + 1 + table.len() + 2 + 2) as u16;
        out.extend_from_slice(&self.version.to_le_bytes());
        out.push(self.count.unwrap_or(self.sections.len() as u8));
        out.extend_from_slice(&table);
        out.extend_from_slice(&header_size.to_le_bytes());
        out.extend_from_slice(&self.magic);
        out
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

/// A valid container with `n` small text sections of type 86.
pub fn simple(n: usize) -> ContainerBuilder {
    (0..n).fold(ContainerBuilder::new(80), |b, i| {
        b.section(SectionSpec::new(&format!("sect{i}"), 86, format!("line{i}\n").as_bytes()))
    })
}
