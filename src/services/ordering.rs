//! 块排序与过滤
//!
//! 编辑视图和公开视图共用同一套排序规则：position 升序，
//! 平局按 id（创建顺序）决出，顺序是确定性的，不依赖
//! 排序算法的稳定性。公开视图先按 is_visible 过滤再排序。
//!
//! 纯函数：输入切片不被修改，输出是新 Vec。

use crate::storage::models::Block;

fn by_position(a: &Block, b: &Block) -> std::cmp::Ordering {
    a.position.cmp(&b.position).then(a.id.cmp(&b.id))
}

/// 编辑视图顺序：全部块，position 升序
pub fn sort_for_editor(blocks: &[Block]) -> Vec<Block> {
    let mut sorted = blocks.to_vec();
    sorted.sort_by(by_position);
    sorted
}

/// 公开视图顺序：先过滤 is_visible，再按 position 升序
pub fn sort_for_public(blocks: &[Block]) -> Vec<Block> {
    let mut visible: Vec<Block> = blocks.iter().filter(|b| b.is_visible).cloned().collect();
    visible.sort_by(by_position);
    visible
}

/// 新块的 position：max(现有 position, 0) + 1，空列表为 1
pub fn next_position(blocks: &[Block]) -> i32 {
    blocks
        .iter()
        .map(|b| b.position)
        .max()
        .unwrap_or(0)
        .max(0)
        + 1
}
