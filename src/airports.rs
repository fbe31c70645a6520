//! Canadian airports shown by the airport cycling mode.

/// ICAO codes in display order.
///
/// Four-character codes fill a six-module display once centered with two
/// leading spaces. A few entries (`EHYP`, `VEGK`) sit outside the `C` prefix
/// and are kept in their rotation slot.
pub const CANADIAN_AIRPORTS: &[&str] = &[
    "CYYC", "CYVR", "CYYZ", "CYUL", "CYEG", "CYHZ", "CYQB", "CYWG", "CYXE", "CYQR",
    "CYYJ", "CYXU", "CYGK", "CYQG", "CYKF", "CYHM", "CYOW", "CYQM", "CYFC", "CYQI",
    "CYQX", "CYYT", "CYDF", "CYAM", "CYSB", "CYQT", "CYTS", "CYTH", "CYXL", "CYQD",
    "CYBR", "CYLL", "CYQF", "CYEN", "CYBG", "CYBC", "CYVP", "CYXR", "CYEY", "CYGL",
    "CYFE", "CYYU", "CYQN", "CYQK", "CYMO", "CYNA", "CYNM", "CYME", "CYML", "CYYY",
    "CYMJ", "CYQL", "CYXH", "CYQU", "CYXS", "CYXJ", "CYYE", "CYSM", "CYFS", "CYFR",
    "CYER", "CYPY", "CYGH", "CYFH", "CYJF", "CYMM", "CZFM", "CYFA", "CYFO", "CZFD",
    "CYDA", "CYDQ", "CYDL", "CYVZ", "CYWJ", "CYID", "CYPR", "CYZD", "CYDC", "CYET",
    "CYOA", "CYEL", "CYEU", "CYND", "CZFA", "CYPA", "CYGO", "CZGI", "CYYR", "CYZE",
    "CZGF", "CYGQ", "CZGS", "CYGX", "CYGB", "CYGM", "CYHK", "CYGR", "CYHT", "CYHY",
    "CYHF", "CYHB", "CYGT", "CZUC", "CYPH", "CYEV", "CYFB", "CYIV", "CYIK", "CYKA",
    "CYLU", "CYKG", "CYAS", "CYAQ", "CZKE", "CYAU", "CYLW", "CYKJ", "CYKX", "CYKO",
    "CYBB", "CYCO", "CYVC", "CYFJ", "CYLH", "CYLR", "CYYL", "CYFT", "CYMG", "CYMW",
    "CYSP", "CYMA", "CYLJ", "CYMX", "CYCH", "CYQA", "CZMD", "CYNT", "CYDP", "CYSR",
    "CYRT", "CYOO", "CYOH", "CYIF", "CYXP", "CYPC", "CYPE", "CYPO", "CYTA", "CYQS",
    "CYPQ", "CYPL", "CYPM", "CZMN", "EHYP", "CYZT", "CYPD", "CCP4", "CYPN", "CYPG",
    "CYPW", "CYPX", "CYVM", "CUHA", "CYRA", "VEGK", "CYRL", "CYRS", "CYUT", "CYRB",
    "CYRV", "CCZ2", "CYXK", "CYRI", "CYRJ", "CYRM", "CYUY", "CZPB", "CYSY", "CYSJ",
    "CYZG", "CZAM", "CYZP", "CZSJ", "CYSK", "CYZR", "CYKL", "CYZV", "CZTM", "CYAW",
    "CYSC", "CYYD", "CYAY", "CYSN", "CYHU", "CYJN", "CYSL", "CYDO", "CYST", "CYJT",
    "CZST", "CYSF", "CYSU", "CZJN", "CYYN", "CYQY", "CYBQ", "CYYH", "CYXT", "CYZW",
    "CTB6", "CZLQ", "CYTR", "CYRQ", "CYUB", "CZFN", "CYMU", "CYBE", "CYVG", "CYVK",
    "CYWK", "CYQH", "CYXZ", "CYWP", "CYNC", "CEM3", "CYXN", "CYZU", "CYXY", "CYVV",
    "CCA6", "CYWL", "CZWL", "CYWY", "CKL3", "CZAC", "CYQV",
];
