//! Clip colors handed out on import.

const CLIP_COLORS: [&str; 8] = [
    "#4f8ef7", "#f76f4f", "#4fd18b", "#c77dff", "#f7c84f", "#4fd1d1", "#f74f9e", "#9ea4b0",
];

pub fn color_for_index(index: usize) -> &'static str {
    CLIP_COLORS[index % CLIP_COLORS.len()]
}
