pub mod dashscope;
pub mod xfyun;
