//! The registry data. Regional locales first (platform-native coverage),
//! then the ISO 639-1 long tail served by the offline-neural backend only.

use super::{LanguageDescriptor, QualityTier};

const fn lang(
    code: &'static str,
    display_name: &'static str,
    native_name: &'static str,
    native_backend: bool,
    tier: QualityTier,
) -> LanguageDescriptor {
    LanguageDescriptor {
        code,
        display_name,
        native_name,
        native_backend,
        tier,
    }
}

use QualityTier::{High, Low, Medium};

pub(super) static LANGUAGES: &[LanguageDescriptor] = &[
    // Regional locales with platform-native support.
    lang("en-US", "English (US)", "English (US)", true, High),
    lang("en-GB", "English (UK)", "English (UK)", true, High),
    lang("en-AU", "English (Australia)", "English (Australia)", true, High),
    lang("en-CA", "English (Canada)", "English (Canada)", true, High),
    lang("en-IN", "English (India)", "English (India)", true, High),
    lang("en-NZ", "English (New Zealand)", "English (New Zealand)", true, High),
    lang("es-ES", "Spanish (Spain)", "Español (España)", true, High),
    lang("es-MX", "Spanish (Mexico)", "Español (México)", true, High),
    lang("es-AR", "Spanish (Argentina)", "Español (Argentina)", true, High),
    lang("es-US", "Spanish (US)", "Español (EE. UU.)", true, High),
    lang("fr-FR", "French", "Français", true, High),
    lang("fr-CA", "French (Canada)", "Français (Canada)", true, High),
    lang("de-DE", "German", "Deutsch", true, High),
    lang("de-AT", "German (Austria)", "Deutsch (Österreich)", true, Medium),
    lang("de-CH", "German (Switzerland)", "Deutsch (Schweiz)", true, Medium),
    lang("it-IT", "Italian", "Italiano", true, High),
    lang("pt-PT", "Portuguese (Portugal)", "Português (Portugal)", true, High),
    lang("pt-BR", "Portuguese (Brazil)", "Português (Brasil)", true, High),
    lang("zh-CN", "Chinese (Simplified)", "中文（简体）", true, High),
    lang("zh-TW", "Chinese (Traditional)", "中文（繁體）", true, High),
    lang("zh-HK", "Chinese (Hong Kong)", "中文（香港）", true, Medium),
    lang("ja-JP", "Japanese", "日本語", true, High),
    lang("ko-KR", "Korean", "한국어", true, High),
    lang("ar-SA", "Arabic (Saudi Arabia)", "العربية", true, High),
    lang("ar-EG", "Arabic (Egypt)", "العربية (مصر)", true, Medium),
    lang("hi-IN", "Hindi", "हिन्दी", true, High),
    lang("ru-RU", "Russian", "Русский", true, High),
    lang("nl-NL", "Dutch", "Nederlands", true, High),
    lang("nl-BE", "Dutch (Belgium)", "Nederlands (België)", true, Medium),
    lang("sv-SE", "Swedish", "Svenska", true, High),
    lang("no-NO", "Norwegian", "Norsk", true, High),
    lang("da-DK", "Danish", "Dansk", true, High),
    lang("fi-FI", "Finnish", "Suomi", true, High),
    lang("pl-PL", "Polish", "Polski", true, High),
    lang("tr-TR", "Turkish", "Türkçe", true, High),
    lang("he-IL", "Hebrew", "עברית", true, Medium),
    lang("id-ID", "Indonesian", "Bahasa Indonesia", true, High),
    lang("ms-MY", "Malay", "Bahasa Melayu", true, Medium),
    lang("th-TH", "Thai", "ไทย", true, Medium),
    lang("vi-VN", "Vietnamese", "Tiếng Việt", true, Medium),
    lang("uk-UA", "Ukrainian", "Українська", true, Medium),
    lang("cs-CZ", "Czech", "Čeština", true, Medium),
    lang("el-GR", "Greek", "Ελληνικά", true, Medium),
    lang("hu-HU", "Hungarian", "Magyar", true, Medium),
    lang("ro-RO", "Romanian", "Română", true, Medium),
    lang("sk-SK", "Slovak", "Slovenčina", true, Medium),
    lang("bg-BG", "Bulgarian", "Български", true, Medium),
    lang("hr-HR", "Croatian", "Hrvatski", true, Medium),
    lang("sr-RS", "Serbian", "Српски", true, Medium),
    lang("ca-ES", "Catalan", "Català", true, Medium),
    // Neural-only long tail (ISO 639-1).
    lang("af", "Afrikaans", "Afrikaans", false, Medium),
    lang("am", "Amharic", "አማርኛ", false, Low),
    lang("as", "Assamese", "অসমীয়া", false, Low),
    lang("az", "Azerbaijani", "Azərbaycan dili", false, Medium),
    lang("ba", "Bashkir", "Башҡортса", false, Low),
    lang("be", "Belarusian", "Беларуская", false, Medium),
    lang("bn", "Bengali", "বাংলা", false, Medium),
    lang("bo", "Tibetan", "བོད་སྐད་", false, Low),
    lang("br", "Breton", "Brezhoneg", false, Low),
    lang("bs", "Bosnian", "Bosanski", false, Medium),
    lang("ceb", "Cebuano", "Sinugboanon", false, Low),
    lang("cy", "Welsh", "Cymraeg", false, Medium),
    lang("dz", "Dzongkha", "རྫོང་ཁ", false, Low),
    lang("eo", "Esperanto", "Esperanto", false, Low),
    lang("et", "Estonian", "Eesti", false, Medium),
    lang("eu", "Basque", "Euskara", false, Medium),
    lang("fa", "Persian", "فارسی", false, Medium),
    lang("fo", "Faroese", "Føroyskt", false, Low),
    lang("fy", "Frisian", "Frysk", false, Low),
    lang("ga", "Irish", "Gaeilge", false, Medium),
    lang("gd", "Scottish Gaelic", "Gàidhlig", false, Low),
    lang("gl", "Galician", "Galego", false, Medium),
    lang("gu", "Gujarati", "ગુજરાતી", false, Medium),
    lang("ha", "Hausa", "Hausa", false, Low),
    lang("haw", "Hawaiian", "ʻŌlelo Hawaiʻi", false, Low),
    lang("ht", "Haitian Creole", "Kreyòl Ayisyen", false, Low),
    lang("hy", "Armenian", "Հայերեն", false, Medium),
    lang("is", "Icelandic", "Íslenska", false, Medium),
    lang("jv", "Javanese", "Basa Jawa", false, Low),
    lang("ka", "Georgian", "ქართული", false, Medium),
    lang("kk", "Kazakh", "Қазақ тілі", false, Medium),
    lang("km", "Khmer", "ខ្មែរ", false, Low),
    lang("kn", "Kannada", "ಕನ್ನಡ", false, Medium),
    lang("ku", "Kurdish", "Kurdî", false, Low),
    lang("ky", "Kyrgyz", "Кыргызча", false, Low),
    lang("la", "Latin", "Latina", false, Low),
    lang("lb", "Luxembourgish", "Lëtzebuergesch", false, Low),
    lang("ln", "Lingala", "Lingála", false, Low),
    lang("lo", "Lao", "ລາວ", false, Low),
    lang("lt", "Lithuanian", "Lietuvių", false, Medium),
    lang("lv", "Latvian", "Latviešu", false, Medium),
    lang("mg", "Malagasy", "Malagasy", false, Low),
    lang("mi", "Maori", "Te Reo Māori", false, Low),
    lang("mk", "Macedonian", "Македонски", false, Medium),
    lang("ml", "Malayalam", "മലയാളം", false, Medium),
    lang("mn", "Mongolian", "Монгол", false, Low),
    lang("mr", "Marathi", "मराठी", false, Medium),
    lang("mt", "Maltese", "Malti", false, Low),
    lang("my", "Burmese", "မြန်မာစာ", false, Low),
    lang("ne", "Nepali", "नेपाली", false, Medium),
    lang("nn", "Norwegian Nynorsk", "Nynorsk", false, Low),
    lang("oc", "Occitan", "Occitan", false, Low),
    lang("pa", "Punjabi", "ਪੰਜਾਬੀ", false, Medium),
    lang("ps", "Pashto", "پښتو", false, Low),
    lang("sa", "Sanskrit", "संस्कृतम्", false, Low),
    lang("sd", "Sindhi", "سنڌي", false, Low),
    lang("si", "Sinhala", "සිංහල", false, Medium),
    lang("sl", "Slovenian", "Slovenščina", false, Medium),
    lang("sn", "Shona", "ChiShona", false, Low),
    lang("so", "Somali", "Soomaali", false, Low),
    lang("sq", "Albanian", "Shqip", false, Medium),
    lang("su", "Sundanese", "Basa Sunda", false, Low),
    lang("sw", "Swahili", "Kiswahili", false, Medium),
    lang("ta", "Tamil", "தமிழ்", false, Medium),
    lang("te", "Telugu", "తెలుగు", false, Medium),
    lang("tg", "Tajik", "Тоҷикӣ", false, Low),
    lang("tk", "Turkmen", "Türkmençe", false, Low),
    lang("tl", "Tagalog", "Tagalog", false, Medium),
    lang("tt", "Tatar", "Татарча", false, Low),
    lang("ug", "Uyghur", "ئۇيغۇرچە", false, Low),
    lang("ur", "Urdu", "اردو", false, Medium),
    lang("uz", "Uzbek", "Oʻzbekcha", false, Medium),
    lang("xh", "Xhosa", "isiXhosa", false, Low),
    lang("yi", "Yiddish", "ייִדיש", false, Low),
    lang("yo", "Yoruba", "Yorùbá", false, Low),
    lang("zu", "Zulu", "isiZulu", false, Low),
    // Additional regional variants kept for host apps that pin a locale.
    lang("en-IE", "English (Ireland)", "English (Ireland)", true, Medium),
    lang("en-ZA", "English (South Africa)", "English (South Africa)", true, Medium),
    lang("en-SG", "English (Singapore)", "English (Singapore)", true, Medium),
    lang("en-PH", "English (Philippines)", "English (Philippines)", false, Medium),
    lang("es-CO", "Spanish (Colombia)", "Español (Colombia)", true, Medium),
    lang("es-CL", "Spanish (Chile)", "Español (Chile)", true, Medium),
    lang("es-PE", "Spanish (Peru)", "Español (Perú)", false, Medium),
    lang("es-VE", "Spanish (Venezuela)", "Español (Venezuela)", false, Medium),
    lang("fr-BE", "French (Belgium)", "Français (Belgique)", true, Medium),
    lang("fr-CH", "French (Switzerland)", "Français (Suisse)", false, Medium),
    lang("ar-AE", "Arabic (UAE)", "العربية (الإمارات)", false, Medium),
    lang("ar-MA", "Arabic (Morocco)", "العربية (المغرب)", false, Low),
    lang("ar-DZ", "Arabic (Algeria)", "العربية (الجزائر)", false, Low),
    lang("ar-IQ", "Arabic (Iraq)", "العربية (العراق)", false, Low),
    lang("ar-JO", "Arabic (Jordan)", "العربية (الأردن)", false, Low),
    lang("ar-KW", "Arabic (Kuwait)", "العربية (الكويت)", false, Low),
    lang("ar-LB", "Arabic (Lebanon)", "العربية (لبنان)", false, Low),
    lang("pt-AO", "Portuguese (Angola)", "Português (Angola)", false, Low),
    lang("zh-SG", "Chinese (Singapore)", "中文（新加坡）", false, Medium),
    lang("ta-LK", "Tamil (Sri Lanka)", "தமிழ் (இலங்கை)", false, Low),
    lang("ta-SG", "Tamil (Singapore)", "தமிழ் (சிங்கப்பூர்)", false, Low),
    lang("ur-IN", "Urdu (India)", "اردو (بھارت)", false, Low),
    lang("bn-IN", "Bengali (India)", "বাংলা (ভারত)", false, Medium),
    lang("sv-FI", "Swedish (Finland)", "Svenska (Finland)", false, Low),
    lang("it-CH", "Italian (Switzerland)", "Italiano (Svizzera)", false, Medium),
    lang("ru-BY", "Russian (Belarus)", "Русский (Беларусь)", false, Low),
    lang("ru-KZ", "Russian (Kazakhstan)", "Русский (Казахстан)", false, Low),
    lang("de-LU", "German (Luxembourg)", "Deutsch (Luxemburg)", false, Low),
    lang("nb-NO", "Norwegian Bokmål", "Bokmål", false, Medium),
    lang("fil-PH", "Filipino", "Filipino", false, Medium),
    lang("gsw-CH", "Swiss German", "Schwiizerdütsch", false, Low),
    lang("yue-HK", "Cantonese", "廣東話", false, Medium),
    lang("kok-IN", "Konkani", "कोंकणी", false, Low),
    lang("mni-IN", "Manipuri", "মৈতৈলোন্", false, Low),
    lang("doi-IN", "Dogri", "डोगरी", false, Low),
    lang("bho-IN", "Bhojpuri", "भोजपुरी", false, Low),
    lang("mai-IN", "Maithili", "मैथिली", false, Low),
    lang("sat-IN", "Santali", "ᱥᱟᱱᱛᱟᱲᱤ", false, Low),
    lang("ks-IN", "Kashmiri", "كٲشُر", false, Low),
    lang("or-IN", "Odia", "ଓଡ଼ିଆ", false, Medium),
    lang("rw-RW", "Kinyarwanda", "Ikinyarwanda", false, Low),
    lang("st-ZA", "Sesotho", "Sesotho", false, Low),
    lang("tn-ZA", "Setswana", "Setswana", false, Low),
    lang("ts-ZA", "Xitsonga", "Xitsonga", false, Low),
    lang("ve-ZA", "Tshivenda", "Tshivenḓa", false, Low),
    lang("nr-ZA", "Southern Ndebele", "isiNdebele", false, Low),
    lang("ss-ZA", "Swati", "siSwati", false, Low),
    lang("om-ET", "Oromo", "Afaan Oromoo", false, Low),
    lang("ti-ET", "Tigrinya", "ትግርኛ", false, Low),
    lang("ak-GH", "Akan", "Akan", false, Low),
    lang("ig-NG", "Igbo", "Asụsụ Igbo", false, Low),
    lang("ff-SN", "Fula", "Pulaar", false, Low),
    lang("wo-SN", "Wolof", "Wolof", false, Low),
    lang("bm-ML", "Bambara", "Bamanankan", false, Low),
];
