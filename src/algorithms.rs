pub mod bitio;
pub mod huffman;
pub mod huffman_tree;
pub mod priority_queue;
