//! Public library API for decoding BPF event buffers with BTF type layouts.

/// Type graph model, alias resolution, and buffer decoding.
pub mod btf;
