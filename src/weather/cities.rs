//! Provincial capitals covered by the sync.

/// A city with its coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    /// Native (Chinese) name
    pub name: &'static str,
    /// English key used for storage and lookups
    pub en: &'static str,
    pub lat: f64,
    pub lon: f64,
}

const fn city(name: &'static str, en: &'static str, lat: f64, lon: f64) -> City {
    City { name, en, lat, lon }
}

pub const PROVINCE_CAPITALS: &[City] = &[
    city("北京", "Beijing", 39.9042, 116.4074),
    city("上海", "Shanghai", 31.2304, 121.4737),
    city("天津", "Tianjin", 39.3434, 117.3616),
    city("重庆", "Chongqing", 29.5630, 106.5516),
    city("哈尔滨", "Harbin", 45.8038, 126.5350),
    city("长春", "Changchun", 43.8868, 125.3245),
    city("沈阳", "Shenyang", 41.8057, 123.4315),
    city("呼和浩特", "Hohhot", 40.8414, 111.7519),
    city("石家庄", "Shijiazhuang", 38.0428, 114.5149),
    city("太原", "Taiyuan", 37.8706, 112.5489),
    city("济南", "Jinan", 36.6512, 117.1201),
    city("郑州", "Zhengzhou", 34.7466, 113.6253),
    city("西安", "Xian", 34.3416, 108.9398),
    city("兰州", "Lanzhou", 36.0611, 103.8343),
    city("银川", "Yinchuan", 38.4872, 106.2309),
    city("西宁", "Xining", 36.6171, 101.7782),
    city("乌鲁木齐", "Urumqi", 43.8256, 87.6168),
    city("合肥", "Hefei", 31.8206, 117.2272),
    city("南京", "Nanjing", 32.0603, 118.7969),
    city("杭州", "Hangzhou", 30.2741, 120.1551),
    city("长沙", "Changsha", 28.2282, 112.9388),
    city("南昌", "Nanchang", 28.6820, 115.8579),
    city("武汉", "Wuhan", 30.5928, 114.3055),
    city("成都", "Chengdu", 30.5728, 104.0668),
    city("贵阳", "Guiyang", 26.6470, 106.6302),
    city("昆明", "Kunming", 25.0389, 102.7183),
    city("南宁", "Nanning", 22.8170, 108.3665),
    city("广州", "Guangzhou", 23.1291, 113.2644),
    city("福州", "Fuzhou", 26.0745, 119.2965),
    city("海口", "Haikou", 20.0444, 110.1999),
    city("台北", "Taipei", 25.0330, 121.5654),
    city("拉萨", "Lhasa", 29.6525, 91.1721),
];

/// Looks up a city by its English key (case-insensitive).
pub fn find_city(en: &str) -> Option<&'static City> {
    PROVINCE_CAPITALS
        .iter()
        .find(|city| city.en.eq_ignore_ascii_case(en))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_find_city() {
        let city = find_city("beijing").unwrap();
        assert_eq!(city.en, "Beijing");
        assert_eq!(city.name, "北京");
        assert!(find_city("Atlantis").is_none());
    }

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<&str> = PROVINCE_CAPITALS.iter().map(|c| c.en).collect();
        assert_eq!(keys.len(), PROVINCE_CAPITALS.len());
    }

    #[test]
    fn test_catalogue_has_32_capitals() {
        assert_eq!(PROVINCE_CAPITALS.len(), 32);
        assert!(find_city("Taipei").is_some());
    }
}
