//! Consensus amino-acid reference sequences for each strain and gene

pub(crate) const HIV1_PR: &str = concat!(
    "PQITLWQRPLVTIKIGGQLKEALLDTGADDTVLEEMNLPGRWKPKMIGGI",
    "GGFIKVRQYDQILIEICGHKAIGTVLVGPTPVNIIGRNLLTQIGCTLNF",
);

pub(crate) const HIV1_RT: &str = concat!(
    "PISPIETVPVKLKPGMDGPKVKQWPLTEEKIKALVEICTEMEKEGKISKI",
    "GPENPYNTPVFAIKKKDSTKWRKLVDFRELNKRTQDFWEVQLGIPHPAGL",
    "KKKKSVTVLDVGDAYFSVPLDKDFRKYTAFTIPSINNETPGIRYQYNVLP",
    "QGWKGSPAIFQSSMTKILEPFRKQNPDIVIYQYMDDLYVGSDLEIGQHRT",
    "KIEELRQHLLRWGFTTPDKKHQKEPPFLWMGYELHPDKWTVQPIVLPEKD",
    "SWTVNDIQKLVGKLNWASQIYAGIKVKQLCKLLRGTKALTEVIPLTEEAE",
    "LELAENREILKEPVHGVYYDPSKDLIAEIQKQGQGQWTYQIYQEPFKNLK",
    "TGKYARMRGAHTNDVKQLTEAVQKIATESIVIWGKTPKFKLPIQKETWEA",
    "WWTEYWQATWIPEWEFVNTPPLVKLWYQLEKEPIVGAETFYVDGAANRET",
    "KLGKAGYVTDRGRQKVVSLTDTTNQKTELQAIHLALQDSGLEVNIVTDSQ",
    "YALGIIQAQPDKSESELVSQIIEQLIKKEKVYLAWVPAHKGIGGNEQVDK",
    "LVSAGIRKVL",
);

pub(crate) const HIV1_IN: &str = concat!(
    "FLDGIDKAQEEHEKYHSNWRAMASDFNLPPVVAKEIVASCDKCQLKGEAM",
    "HGQVDCSPGIWQLDCTHLEGKIILVAVHVASGYIEAEVIPAETGQETAYF",
    "LLKLAGRWPVKTIHTDNGSNFTSTTVKAACWWAGIKQEFGIPYNPQSQGV",
    "VESMNKELKKIIGQVRDQAEHLKTAVQMAVFIHNFKRKGGIGGYSAGERI",
    "VDIIATDIQTKELQKQITKIQNFRVYYRDSRDPLWKGPAKLLWKGEGAVV",
    "IQDNSDIKVVPRRKAKIIRDYGKQMAGDDCVASRQDED",
);

pub(crate) const HIV2A_PR: &str = concat!(
    "PQFSLWKRPVVTAYIEGQPVEVLLDTGADDSIVAGIELGNNYSPKIVGGI",
    "GGFINTKEYKNVEIEVLNKKVRATIMTGDTPINIFGRNILTALGMSLNL",
);

pub(crate) const HIV2A_RT: &str = concat!(
    "PVAKVEPIKIMLKPGKDGPKLRQWPLTKEKIEALKEICEKMEKEGQLEEA",
    "PPTNPYNTPTFAIKKKDKNKWRMLIDFRELNKVTQDFTEIQLGIPHPAGL",
    "AKKRRITVLDVGDAYFSIPLHEDFRPYTAFTLPSVNNAEPGKRYIYKVLP",
    "QGWKGSPAIFQHTMRQVLEPFRKANKDVIIIQYMDDILIASDRTDLEHDR",
    "VVLQLKELLNGLGFSTPDEKFQKDPPYHWMGYELWPTKWKLQKIQLPQKE",
    "IWTVNDIQKLVGVLNWAAQLYPGIKTKHLCRLIRGKMTLTEEVQWTELAE",
    "AELEENRIILSQEQEGHYYQEEKELEATVQKDQENQWTYKIHQEEKILKV",
    "GKYAKVKNTHTNGIRLLAQVVQKIGKEALVIWGRIPKFHLPVEREIWEQW",
    "WDNYWQVTWIPDWDFVSTPPLVRLAFNLVGDPIPGAETFYTDGSCNRQSK",
    "EGKAGYVTDRGKDKVKKLEQTTNQQAELEAFAMALTDSGPKVNIIVDSQY",
    "VMGISASQPTESESKIVNQIIEEMIKKEAIYVAWVPAHKGIGGNQEVDHL",
    "VSQGIRQVL",
);

pub(crate) const HIV2A_IN: &str = concat!(
    "FLEKIEPAQEEHEKYHSNVKELSHKFGIPNLVARQIVNSCAQCQQKGEAI",
    "HGQVNAELGTWQMDCTHLEGKIIIVAVHVASGFIEAEVIPQESGRQTALF",
    "LLKLASRWPITHLHTDNGANFTSQEVKMVAWWIGIEQSFGVPYNPQSQGV",
    "VEAMNHHLKNQISRIREQANTIETIVLMAIHCMNFKRRGGIGDMTPSERL",
    "INMITTEQEIQFLQAKNSKLKDFRVYFREGRDQLWKGPGELLWKGEGAVL",
    "VKVGTDIKIIPRRKAKIIRDYGGRQEMDSGSHLEGAREDGEMA",
);

pub(crate) const HIV2B_PR: &str = concat!(
    "PQFSLWRRPVVKATIEGQSVEVLLDTGADDSIVAGIELGSNYTPKIVGGI",
    "GGFINTNEYKNVEIEVVGKRVRATVMTGDTPINIFGRNILNSLGMTLNF",
);

pub(crate) const HIV2B_RT: &str = concat!(
    "PVARIEPVKVQLKPEKDGPKIRQWPLSKEKILALKEICEKMEKEGQLEEA",
    "PPTNPYNSPTFAIKKKDKNKWRMLIDFRELNKVTQEFTEVQLGIPHPAGL",
    "ASKKRITVLDVGDAYFSVPLDPDFRQYTAFTLPAVNNAEPGKRYLYKVLP",
    "QGWKGSPAIFQYTMAKVLDPFRKANNDVTIIQYMDDILVASDRSDLEHDR",
    "VVSQLKELLNNMGFSTPEEKFQKDPPFKWMGYELWPKKWKLQKIQLPEKE",
    "VWTVNDIQKLVGVLNWAAQLFPGIKTRHICKLIRGKMTLTEEVQWTELAE",
    "AEFQENKIILEQEQEGSYYKEGVPLEATVQKNLANQWTYKIHQGDKILKV",
    "GKYAKVKNTHTNGVRLLAHVVQKIGKEALVIWGEIPMFHLPVERETWDQW",
    "WTDYWQVTWIPEWDFVSTPPLIRLAYNLVKDPLEGVETYYTDGSCNKASK",
    "EGKAGYVTDRGKDKVKPLEQTTNQQAELEAFALALQDSGPQVNIIVDSQY",
    "VMGIVAAQPTETESPIVREIIEEMIKKEKIYVGWVPAHKGLGGNQEVDHL",
    "VSQGIRQIL",
);

pub(crate) const HIV2B_IN: &str = concat!(
    "FLEKIEPAQEEHEKYHNNVKELVHKFGIPQLVARQIVNSCDKCQQKGEAI",
    "HGQVNSELGTWQMDCTHLEGKVIIVAVHVASGFIEAEVIPQETGRQTALF",
    "LLKLASRWPITHLHTDNGANFTSQDVKMAAWWIGIEQTFGVPYNPESQGV",
    "VEAMNHHLKNQIDRIRDQAVSIETVVLMATHCMNFKRRGGIGDMTPAERI",
    "VNMITTEQEIQFLQTKNLKFQNFRVYYREGRDQLWKGPGDLLWKGEGAVI",
    "IKVGTEIKVIPRRKAKIIRNYGGGKELDCSADVEDTMQAREVAQSN",
);
