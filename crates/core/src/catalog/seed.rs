use chrono::{DateTime, Utc};

use crate::domain::category::{Category, CategoryId};

#[derive(Clone, Copy, Debug)]
pub struct CategorySeed {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub parent_id: Option<&'static str>,
    pub sort_order: i32,
}

const fn root(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    sort_order: i32,
) -> CategorySeed {
    CategorySeed { id, name, description, parent_id: None, sort_order }
}

const fn child(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    parent_id: &'static str,
    sort_order: i32,
) -> CategorySeed {
    CategorySeed { id, name, description, parent_id: Some(parent_id), sort_order }
}

/// Default two-level catalog. Parents precede their children so rows can be inserted in order.
pub const CATEGORY_SEEDS: &[CategorySeed] = &[
    root("cat-tops", "上衣", "各类上身衣物", 1),
    root("cat-bottoms", "下装", "各类下身衣物", 2),
    root("cat-shoes", "鞋子", "各类鞋履", 3),
    root("cat-accessories", "配饰", "各类配饰用品", 4),
    root("cat-underwear", "内衣", "贴身衣物", 5),
    root("cat-outerwear", "外套", "各类外套", 6),
    child("cat-tops-tshirt", "T恤", "短袖T恤衫", "cat-tops", 1),
    child("cat-tops-shirt", "衬衫", "各类衬衫", "cat-tops", 2),
    child("cat-tops-sweater", "毛衣", "针织毛衣", "cat-tops", 3),
    child("cat-tops-vest", "背心", "无袖背心", "cat-tops", 4),
    child("cat-tops-camisole", "吊带", "吊带上衣", "cat-tops", 5),
    child("cat-tops-hoodie", "卫衣", "休闲卫衣", "cat-tops", 6),
    child("cat-bottoms-trousers", "裤子", "各类长裤", "cat-bottoms", 1),
    child("cat-bottoms-jeans", "牛仔裤", "各类牛仔裤", "cat-bottoms", 2),
    child("cat-bottoms-suit", "西裤", "正装西裤", "cat-bottoms", 3),
    child("cat-bottoms-shorts", "短裤", "各类短裤", "cat-bottoms", 4),
    child("cat-bottoms-skirt", "裙子", "各类裙装", "cat-bottoms", 5),
    child("cat-bottoms-track", "运动裤", "运动长裤", "cat-bottoms", 6),
    child("cat-shoes-sneakers", "运动鞋", "各类运动鞋", "cat-shoes", 1),
    child("cat-shoes-leather", "皮鞋", "正装皮鞋", "cat-shoes", 2),
    child("cat-shoes-boots", "靴子", "各类靴子", "cat-shoes", 3),
    child("cat-shoes-sandals", "凉鞋", "夏季凉鞋", "cat-shoes", 4),
    child("cat-shoes-slippers", "拖鞋", "居家拖鞋", "cat-shoes", 5),
    child("cat-shoes-heels", "高跟鞋", "女式高跟鞋", "cat-shoes", 6),
    child("cat-accessories-bags", "包包", "各类包袋", "cat-accessories", 1),
    child("cat-accessories-hats", "帽子", "各类帽子", "cat-accessories", 2),
    child("cat-accessories-scarves", "围巾", "围巾丝巾", "cat-accessories", 3),
    child("cat-accessories-watches", "手表", "各类手表", "cat-accessories", 4),
    child("cat-accessories-jewelry", "首饰", "项链耳环等", "cat-accessories", 5),
    child("cat-accessories-glasses", "眼镜", "眼镜墨镜", "cat-accessories", 6),
    child("cat-accessories-belts", "腰带", "各类腰带", "cat-accessories", 7),
    child("cat-underwear-briefs", "内裤", "各类内裤", "cat-underwear", 1),
    child("cat-underwear-bras", "文胸", "女式文胸", "cat-underwear", 2),
    child("cat-underwear-thermal", "保暖内衣", "保暖内衣", "cat-underwear", 3),
    child("cat-underwear-socks", "袜子", "各类袜子", "cat-underwear", 4),
    child("cat-outerwear-jacket", "夹克", "各类夹克", "cat-outerwear", 1),
    child("cat-outerwear-coat", "大衣", "长款大衣", "cat-outerwear", 2),
    child("cat-outerwear-down", "羽绒服", "保暖羽绒服", "cat-outerwear", 3),
    child("cat-outerwear-blazer", "西装", "正装西装", "cat-outerwear", 4),
    child("cat-outerwear-trench", "风衣", "时尚风衣", "cat-outerwear", 5),
    child("cat-outerwear-cardigan", "开衫", "针织开衫", "cat-outerwear", 6),
];

pub fn seed_categories(now: DateTime<Utc>) -> Vec<Category> {
    CATEGORY_SEEDS
        .iter()
        .map(|seed| Category {
            id: CategoryId(seed.id.to_string()),
            name: seed.name.to_string(),
            description: Some(seed.description.to_string()),
            parent_id: seed.parent_id.map(|parent| CategoryId(parent.to_string())),
            sort_order: seed.sort_order,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .collect()
}
